// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Volume engines - claim-to-job compilation strategies.

pub mod jiva;
mod traits;

pub use jiva::{JIVA_ENGINE, JivaEngine};
pub use traits::*;
