pub mod libs;

pub use libs::{
    SensorReading,
    frame::{FrameError, SensorFrame, decode, encode},
};
