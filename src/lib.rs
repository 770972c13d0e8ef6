// SPDX-License-Identifier: GPL-3.0-or-later

pub mod config;
pub mod error;
pub mod goal;
pub mod ledger;
pub mod reconcile;
pub mod report;
pub mod service;
pub mod source;
pub mod storage;
