use crate::virtual_machine::Word;
use std::collections::VecDeque;

/// FIFO input and output queues of one VM instance.
///
/// Reading from an empty input queue is not an error: it returns `None` and the
/// execution unit suspends on the input instruction until more input arrives.
#[derive(Clone, Debug, Default)]
pub struct IoChannel {
    input: VecDeque<Word>,
    output: VecDeque<Word>,
}

impl IoChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pops the next input value, or `None` when the queue is empty.
    pub fn read(&mut self) -> Option<Word> {
        self.input.pop_front()
    }

    /// Appends a value to the output queue. Never blocks.
    pub fn write(&mut self, value: Word) {
        self.output.push_back(value);
    }

    /// Queues a value for the next `read`.
    pub fn push_input(&mut self, value: Word) {
        self.input.push_back(value);
    }

    /// Takes the oldest output value.
    pub fn pop_output(&mut self) -> Option<Word> {
        self.output.pop_front()
    }

    /// Takes every pending output value, oldest first.
    pub fn drain_output(&mut self) -> Vec<Word> {
        self.output.drain(..).collect()
    }

    /// Number of input values not yet read.
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Number of output values not yet taken.
    pub fn pending_output(&self) -> usize {
        self.output.len()
    }
}

impl Extend<Word> for IoChannel {
    fn extend<T: IntoIterator<Item = Word>>(&mut self, iter: T) {
        self.input.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_fifo() {
        let mut io = IoChannel::new();
        io.push_input(1);
        io.extend([2, 3]);
        assert_eq!(io.pending_input(), 3);
        assert_eq!(io.read(), Some(1));
        assert_eq!(io.read(), Some(2));
        assert_eq!(io.read(), Some(3));
        assert_eq!(io.read(), None);
    }

    #[test]
    fn output_is_fifo() {
        let mut io = IoChannel::new();
        io.write(10);
        io.write(20);
        io.write(30);
        assert_eq!(io.pop_output(), Some(10));
        assert_eq!(io.drain_output(), vec![20, 30]);
        assert_eq!(io.pending_output(), 0);
    }
}
