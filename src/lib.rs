//! Fluent command trees for voxel game server plugins.
//!
//! Plugins build a tree of literal and typed-argument nodes, attach
//! executors and permission gates, and hand raw token vectors from the
//! host platform to a [`commands::CommandDispatcher`]. The dispatcher
//! walks the tree, parses arguments, and either runs the matched
//! executor or reports a diagnosable failure back to the sender.

#![deny(rust_2018_idioms)]

pub mod commands;
