//! Buildhook event source infrastructure.
//!
//! Turns the object-storage notification delivered to one invocation into a
//! [`pipeline::EventBatch`]. The delivery mechanism itself (serverless
//! runtime, local file replay) is chosen in `cli`; this crate only knows the
//! payload shape.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Payload layout and key encoding live here. The
//! [`pipeline`] crate sees only [`pipeline::EventBatch`].

pub mod notification;

pub use notification::{
    decode_notification, decode_notification_slice, KeyEncoding, ListenerError,
};
