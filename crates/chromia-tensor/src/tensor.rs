use thiserror::Error;

/// An error type for tensor operations.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// Tensor shape does not match the provided data.
    #[error("Shape mismatch: expected {expected} elements for shape, but got {actual} elements in data")]
    InvalidShape {
        /// Expected number of elements based on shape
        expected: usize,
        /// Actual number of elements in the data
        actual: usize,
    },

    /// Tensor dimensions incompatible for the requested operation.
    #[error("Dimension mismatch: {message}. Expected shape: {expected}, got: {actual}")]
    DimensionMismatch {
        /// Human-readable description of the mismatch
        message: String,
        /// Expected shape description
        expected: String,
        /// Actual shape description
        actual: String,
    },
}

impl TensorError {
    /// Creates an InvalidShape error.
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }
}

/// Computes the strides for a row-major (C-contiguous) tensor layout.
///
/// # Examples
///
/// ```rust
/// use chromia_tensor::get_strides_from_shape;
///
/// let strides = get_strides_from_shape([2, 3, 4]);
/// assert_eq!(strides, [12, 4, 1]);
/// ```
pub fn get_strides_from_shape<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides: [usize; N] = [0; N];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// A multi-dimensional array (tensor) with owned, contiguous data.
///
/// # Type Parameters
///
/// * `T` - The element type stored in the tensor
/// * `N` - The number of dimensions (checked at compile time)
///
/// The data is always kept in row-major order; operations that change the
/// element order (like [`Tensor::permute_axes`]) return a new tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<T, const N: usize> {
    data: Vec<T>,
    /// The shape of the tensor.
    pub shape: [usize; N],
    /// The strides of the tensor data in memory.
    pub strides: [usize; N],
}

impl<T, const N: usize> Tensor<T, N> {
    /// Creates a new tensor from a shape and a vector of data.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidShape`] if the data length does not match the shape.
    pub fn from_shape_vec(shape: [usize; N], data: Vec<T>) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }
        let strides = get_strides_from_shape(shape);
        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    /// Creates a new tensor by evaluating `f` at every index in row-major order.
    pub fn from_shape_fn<F>(shape: [usize; N], f: F) -> Self
    where
        F: Fn([usize; N]) -> T,
    {
        let strides = get_strides_from_shape(shape);
        let numel = shape.iter().product::<usize>();
        let data = (0..numel)
            .map(|offset| f(unravel_index(offset, &shape, &strides)))
            .collect();
        Self {
            data,
            shape,
            strides,
        }
    }

    /// Returns the tensor data as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the tensor data as a mutable slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the tensor and returns the underlying vector.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Returns the number of elements in the tensor.
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Returns the offset in the underlying buffer for the given index.
    pub fn get_iter_offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for ((&idx, &dim_size), &stride) in index.iter().zip(&self.shape).zip(&self.strides) {
            if idx >= dim_size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Returns a reference to the element at the given index without bounds checks
    /// on the individual dimensions.
    ///
    /// # Panics
    ///
    /// Panics if the computed offset falls outside the buffer.
    #[inline]
    pub fn get_unchecked(&self, index: [usize; N]) -> &T {
        let offset = index
            .iter()
            .zip(&self.strides)
            .fold(0, |acc, (&idx, &stride)| acc + idx * stride);
        &self.data[offset]
    }

    /// Returns a reference to the element at the given index, or `None` if out of bounds.
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.get_iter_offset(index).map(|offset| &self.data[offset])
    }

    /// Reshapes the tensor into a new rank, keeping the data untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidShape`] if the new shape has a different
    /// number of elements.
    pub fn reshape<const M: usize>(self, shape: [usize; M]) -> Result<Tensor<T, M>, TensorError> {
        Tensor::from_shape_vec(shape, self.data)
    }

    /// Permutes the axes of the tensor, returning a new contiguous tensor.
    ///
    /// `axes[i]` names the source dimension that becomes dimension `i`.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::DimensionMismatch`] if `axes` is not a permutation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chromia_tensor::Tensor;
    ///
    /// let t = Tensor::<i32, 2>::from_shape_vec([2, 2], vec![1, 2, 3, 4]).unwrap();
    /// let p = t.permute_axes([1, 0]).unwrap();
    /// assert_eq!(p.as_slice(), &[1, 3, 2, 4]);
    /// ```
    pub fn permute_axes(&self, axes: [usize; N]) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        let mut seen = [false; N];
        for &axis in axes.iter() {
            if axis >= N || seen[axis] {
                return Err(TensorError::DimensionMismatch {
                    message: "axes must be a permutation of the tensor dimensions".to_string(),
                    expected: format!("{:?}", self.shape),
                    actual: format!("{axes:?}"),
                });
            }
            seen[axis] = true;
        }

        let mut shape = [0; N];
        let mut src_strides = [0; N];
        for (i, &axis) in axes.iter().enumerate() {
            shape[i] = self.shape[axis];
            src_strides[i] = self.strides[axis];
        }

        let strides = get_strides_from_shape(shape);
        let numel = self.numel();
        let data = (0..numel)
            .map(|offset| {
                let index = unravel_index(offset, &shape, &strides);
                let src_offset = index
                    .iter()
                    .zip(&src_strides)
                    .fold(0, |acc, (&idx, &stride)| acc + idx * stride);
                self.data[src_offset].clone()
            })
            .collect();

        Ok(Self {
            data,
            shape,
            strides,
        })
    }

}

fn unravel_index<const N: usize>(
    mut offset: usize,
    shape: &[usize; N],
    strides: &[usize; N],
) -> [usize; N] {
    let mut index = [0; N];
    for i in 0..N {
        if shape[i] == 0 {
            continue;
        }
        index[i] = offset / strides[i];
        offset %= strides[i];
    }
    index
}
