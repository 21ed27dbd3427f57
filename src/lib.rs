// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `iotdash` - Client library for an IoT device dashboard.
//!
//! The dashboard talks to a backend that relays commands to lighting
//! controllers, three-phase controllers and IR air-conditioner blasters, and
//! serves aggregated telemetry. This library provides:
//!
//! - **Device control**: optimistic commands, reconciliation polling and
//!   rollback on failure or timeout ([`control`])
//! - **Analytics**: chart-ready power, carbon footprint, working hours and
//!   savings series ([`analytics`])
//! - **Fleet listing**: normalized device lists with filters ([`fleet`])
//! - **Profile**: persisted session and per-organization chart flags
//!   ([`profile`])
//!
//! # Quick Start
//!
//! ## Controlling a Device
//!
//! ```no_run
//! use std::sync::Arc;
//! use iotdash::{ControlSession, HttpConfig};
//! use iotdash::types::{Channel, RelayState};
//!
//! #[tokio::main]
//! async fn main() -> iotdash::Result<()> {
//!     let backend = Arc::new(
//!         HttpConfig::new("https://api.example.com")
//!             .with_token("secret")
//!             .into_client()?,
//!     );
//!
//!     let session = ControlSession::builder(backend, "light-12").mount().await?;
//!     let mut state = session.watch();
//!
//!     // Shows ON at once, reverts if the device never confirms
//!     session.set_relay(Channel::R, RelayState::On).await?;
//!
//!     while state.changed().await.is_ok() {
//!         println!("{:?}", state.borrow().mode(Channel::R));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Loading a Chart
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use iotdash::HttpConfig;
//! use iotdash::analytics::{ChartData, Metric, SeriesQuery, Window, load_chart};
//!
//! #[tokio::main]
//! async fn main() -> iotdash::Result<()> {
//!     let backend = HttpConfig::new("https://api.example.com").into_client()?;
//!
//!     let day = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap_or_default();
//!     let query = SeriesQuery::new("light-12", Metric::Power, Window::Daily(day));
//!
//!     match load_chart(&backend, &query).await {
//!         ChartData::Series(chart) => println!("total {}", chart.summary.total),
//!         ChartData::NoData => println!("No data available"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod command;
pub mod control;
pub mod error;
pub mod event;
pub mod fleet;
pub mod profile;
pub mod protocol;
pub mod reconcile;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod types;

pub use analytics::{ChartData, Metric, SeriesQuery, Timeframe, Window, load_chart};
pub use command::{Command, ControlCommand, ControlIntent};
pub use control::{ControlSession, ControlSessionBuilder};
pub use error::{DeviceError, Error, ParseError, ProtocolError, Result, ValueError};
pub use event::{ControlEvent, EventBus};
pub use fleet::{DeviceFilter, DeviceSummary, list_devices};
pub use profile::{AuthSession, ChartRules, FeatureFlags, UserProfile};
pub use protocol::{Backend, DispatchMode};
#[cfg(feature = "http")]
pub use protocol::{HttpClient, HttpConfig};
pub use reconcile::ControlTiming;
pub use snapshot::DeviceSnapshot;
pub use state::ControlState;
pub use types::{Channel, ControlMode, DeviceFamily, DeviceId, Intensity, RelayState, Setpoint};
