pub mod decoder;
pub mod message;

pub use decoder::{DecodedLines, FrameLineDecoder, StreamTail};
pub use message::{MessageClassifier, ObjectSample, StatusMessage, StreamFrame, StreamMessage};
