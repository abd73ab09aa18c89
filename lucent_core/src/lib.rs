// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage-driven window registry and compositing engine.
//!
//! `lucent_core` keeps a local replica of the top-level windows of a screen,
//! accumulates the screen area that needs redrawing, and composes a frame
//! from the window stack and the desktop background. It never draws or does
//! region arithmetic itself: all of that is requested from a
//! [`RenderService`](service::RenderService) implemented by a backend. It is
//! `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   Backend (event source)
//!       │  Event + Sequence
//!       ▼
//!   Compositor::handle_event() ──► WindowRegistry / DamageAccumulator
//!       │                              │
//!       │  burst drained               │
//!       ▼                              ▼
//!   Compositor::flush() ──► paint pass ──► RenderService requests
//!                                              │
//!                 ┌────────────────────────────┘
//!                 ▼
//!   Event::Error ──► SuppressionLedger ──► dropped or logged
//! ```
//!
//! **[`compositor`]**: The [`Compositor`](compositor::Compositor) state
//! object: construction, event reactor, window lifecycle and the paint pass.
//!
//! **[`window`]**: [`ManagedWindow`](window::ManagedWindow) with its cached
//! service resources and the stacking-ordered
//! [`WindowRegistry`](window::WindowRegistry).
//!
//! **[`damage`]**: [`DamageAccumulator`](damage::DamageAccumulator), the
//! running union of regions needing redraw.
//!
//! **[`mode`]**: Pure classification of a window into solid, translucent or
//! ARGB painting.
//!
//! **[`ledger`]**: [`SuppressionLedger`](ledger::SuppressionLedger) for
//! failures of requests that raced against window destruction.
//!
//! **[`service`]**: The [`RenderService`](service::RenderService) contract
//! backends implement.
//!
//! **[`event`]**: The closed set of notifications the reactor consumes.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! paint-pass instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod atoms;
pub mod compositor;
pub mod config;
pub mod damage;
pub mod error;
pub mod event;
pub mod geometry;
pub mod id;
pub mod ledger;
pub mod mode;
pub mod service;
pub mod trace;
pub mod window;

#[cfg(test)]
mod testing;
