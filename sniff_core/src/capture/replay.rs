use std::collections::VecDeque;

use super::{FrameSource, ReadError, StopToken};

/// 内存中的帧队列，读完后返回 [`ReadError::EndOfStream`]
#[derive(Debug, Default)]
pub struct ReplaySource {
    frames: VecDeque<Vec<u8>>,
    current: Vec<u8>,
}

impl ReplaySource {
    pub fn new<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            frames: frames.into_iter().collect(),
            current: Vec::new(),
        }
    }

    pub fn push(&mut self, frame: Vec<u8>) {
        self.frames.push_back(frame);
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self, stop: &StopToken) -> Result<&[u8], ReadError> {
        if stop.is_stopped() {
            return Err(ReadError::Interrupted);
        }
        match self.frames.pop_front() {
            Some(frame) => {
                self.current = frame;
                Ok(&self.current)
            }
            None => Err(ReadError::EndOfStream),
        }
    }

    fn name(&self) -> &str {
        "in-memory replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_in_order() {
        let mut source = ReplaySource::new(vec![vec![1], vec![2, 2]]);
        source.push(vec![3, 3, 3]);
        let stop = StopToken::new();
        assert_eq!(source.next_frame(&stop).unwrap(), &[1]);
        assert_eq!(source.next_frame(&stop).unwrap(), &[2, 2]);
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.next_frame(&stop).unwrap(), &[3, 3, 3]);
        assert!(matches!(source.next_frame(&stop), Err(ReadError::EndOfStream)));
    }

    #[test]
    fn test_stopped_token_interrupts() {
        let mut source = ReplaySource::new(vec![vec![1]]);
        let stop = StopToken::new();
        stop.stop();
        assert!(matches!(source.next_frame(&stop), Err(ReadError::Interrupted)));
        assert_eq!(source.remaining(), 1);
    }
}
