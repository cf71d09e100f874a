use thiserror::Error;

/// Error type for tensor operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    /// The data does not hold the number of elements the shape asks for.
    #[error("Shape needs {expected} elements but the data has {actual}")]
    InvalidShape {
        /// Product of the shape dimensions.
        expected: usize,
        /// Length of the data.
        actual: usize,
    },

    /// A batch index exceeds the leading dimension.
    #[error("Index {index} out of bounds for leading dimension of size {size}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The size of the leading dimension.
        size: usize,
    },

    /// Tensors to concatenate differ after the leading dimension.
    #[error("Cannot concatenate shape {actual:?} onto {expected:?}: trailing dimensions differ")]
    TrailingShapeMismatch {
        /// Shape of the first tensor.
        expected: Vec<usize>,
        /// Shape of the offending tensor.
        actual: Vec<usize>,
    },

    /// No tensors were given to concatenate.
    #[error("Cannot concatenate zero tensors")]
    EmptyConcat,
}

/// Row-major strides: the last dimension is contiguous.
fn row_major_strides<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides = [0; N];
    let mut stride = 1;
    for (s, dim) in strides.iter_mut().zip(shape).rev() {
        *s = stride;
        stride *= dim;
    }
    strides
}

/// An owned, contiguous, row-major array of `N` dimensions.
///
/// Tensors are `Send` and `Sync` whenever `T` is, so a volume can be shared by
/// reference across the render worker threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T, const N: usize> {
    data: Vec<T>,
    /// The shape of the tensor.
    pub shape: [usize; N],
    /// Elements skipped per step along each dimension.
    pub strides: [usize; N],
}

impl<T, const N: usize> Tensor<T, N> {
    /// Wrap `data` laid out row-major in `shape`.
    ///
    /// # Errors
    ///
    /// [`TensorError::InvalidShape`] if `data` does not hold exactly
    /// `shape.iter().product()` elements.
    ///
    /// ```
    /// use drr_tensor::Tensor3;
    ///
    /// let volume = Tensor3::<u16>::from_shape_vec([1, 2, 2], vec![0, 1, 1, 2]).unwrap();
    /// assert_eq!(volume.strides, [4, 2, 1]);
    /// ```
    pub fn from_shape_vec(shape: [usize; N], data: Vec<T>) -> Result<Self, TensorError> {
        let expected = shape.iter().product::<usize>();
        if expected != data.len() {
            return Err(TensorError::InvalidShape {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            shape,
            strides: row_major_strides(shape),
        })
    }

    /// A tensor of `shape` with every element set to `value`.
    pub fn from_shape_val(shape: [usize; N], value: T) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        let numel = shape.iter().product::<usize>();
        Self::from_shape_vec(shape, vec![value; numel])
    }

    /// A tensor of `shape` whose element at `[i0, .., iN]` is `f([i0, .., iN])`.
    ///
    /// `f` is called in row-major order.
    pub fn from_shape_fn<F>(shape: [usize; N], f: F) -> Result<Self, TensorError>
    where
        F: Fn([usize; N]) -> T,
    {
        let numel = shape.iter().product::<usize>();
        let data = (0..numel)
            .map(|flat| {
                let mut index = [0; N];
                let mut rest = flat;
                for (i, dim) in index.iter_mut().zip(shape).rev() {
                    *i = rest % dim;
                    rest /= dim;
                }
                f(index)
            })
            .collect();
        Self::from_shape_vec(shape, data)
    }

    /// Number of elements.
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// The elements in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The elements in row-major order, mutably.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterate over the elements in row-major order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Flat offset of `index`, or `None` if any component is out of bounds.
    fn offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for ((&idx, dim), stride) in index.iter().zip(self.shape).zip(self.strides) {
            if idx >= dim {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// The element at `index`, or `None` out of bounds.
    ///
    /// ```
    /// use drr_tensor::Tensor4;
    ///
    /// let images = Tensor4::from_shape_fn([2, 1, 2, 3], |[b, _, v, u]| b * 10 + v * 3 + u).unwrap();
    /// assert_eq!(images.get([1, 0, 1, 2]), Some(&15));
    /// assert!(images.get([2, 0, 0, 0]).is_none());
    /// ```
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.offset(index).and_then(|i| self.data.get(i))
    }

    /// A tensor of the same shape with `f` applied to every element.
    pub fn map<U, F>(&self, f: F) -> Tensor<U, N>
    where
        F: Fn(&T) -> U,
    {
        Tensor {
            data: self.data.iter().map(f).collect(),
            shape: self.shape,
            strides: self.strides,
        }
    }

    /// Returns the contiguous block of the leading dimension at `index`,
    /// e.g. one image `(C, H, W)` of a `(B, C, H, W)` batch.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` exceeds the leading dimension.
    pub fn outer_slice(&self, index: usize) -> Result<&[T], TensorError> {
        let size = self.shape.first().copied().unwrap_or(0);
        if index >= size {
            return Err(TensorError::IndexOutOfBounds { index, size });
        }
        let block = self.strides.first().copied().unwrap_or(1);
        Ok(&self.data[index * block..(index + 1) * block])
    }

    /// Concatenates tensors along the leading dimension.
    ///
    /// All trailing dimensions must match.
    ///
    /// # Errors
    ///
    /// Returns an error if no tensors are given or the trailing shapes differ.
    pub fn concat(tensors: &[Tensor<T, N>]) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        let first = tensors.first().ok_or(TensorError::EmptyConcat)?;
        let mut shape = first.shape;
        let mut data = Vec::with_capacity(tensors.iter().map(|t| t.numel()).sum());
        for (i, t) in tensors.iter().enumerate() {
            if t.shape[1..] != first.shape[1..] {
                return Err(TensorError::TrailingShapeMismatch {
                    expected: first.shape.to_vec(),
                    actual: t.shape.to_vec(),
                });
            }
            if i > 0 {
                shape[0] += t.shape[0];
            }
            data.extend_from_slice(&t.data);
        }
        Self::from_shape_vec(shape, data)
    }
}
