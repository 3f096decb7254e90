use crate::{error::GridError, field::{Field, Sample}};

/// Two owned buffers of the same shape and a flag choosing which one is current.
///
/// Passes read from [`read`](Self::read), write into the other buffer and then call
/// [`swap`](Self::swap) to make the result current.
#[derive(Debug, Clone)]
pub struct DoubleField<T> {
    buffers: [Field<T>; 2],
    /// Index of the buffer holding the current state.
    read: usize,
}

impl<T: Sample> DoubleField<T> {
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        Self::from_field(Field::new(width, height)?)
    }

    /// Wraps `field` as the current state, allocating a matching scratch buffer.
    pub fn from_field(field: Field<T>) -> Result<Self, GridError> {
        let scratch = Field::new(field.width(), field.height())?;

        Ok(Self {
            buffers: [field, scratch],
            read: 0,
        })
    }

    #[inline]
    pub fn read(&self) -> &Field<T> {
        &self.buffers[self.read]
    }

    #[inline]
    pub fn read_mut(&mut self) -> &mut Field<T> {
        &mut self.buffers[self.read]
    }

    #[inline]
    pub fn write(&mut self) -> &mut Field<T> {
        &mut self.buffers[1 - self.read]
    }

    /// Borrows the current buffer for reading and the scratch buffer for writing.
    #[inline]
    pub fn split(&mut self) -> (&Field<T>, &mut Field<T>) {
        let [a, b] = &mut self.buffers;
        if self.read == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        }
    }

    #[inline]
    pub fn swap(&mut self) {
        self.read = 1 - self.read;
    }

    pub fn fill(&mut self, value: T) {
        for buffer in self.buffers.iter_mut() {
            buffer.fill(value);
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.read().width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.read().height()
    }
}
