// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

pub mod bridge;
pub mod client;
pub mod config;
pub mod content;
pub mod distribute;
pub mod error;
pub mod types;

// Re-export the main entry points
pub use bridge::{Bridge, HeaderWatcher, NotificationReport, Stage};
pub use config::BridgeConfig;
pub use content::{ChainId, ContentKey, ContentType, ForkSchedule};
pub use distribute::{connect_nodes, Distributor, PushReport};
pub use error::{BridgeError, EncodingError, NotificationError, ValidationError};
