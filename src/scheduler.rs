// Copyright 2018-2026 the Deno authors. All rights reserved. MIT license.
//! FIFO ordering of top-level `define` calls (§4.6 of the spec).
//!
//! This only tracks *which* top-level Module gets the next attempt at
//! driving its subgraph to completion; the actual readiness/post-order
//! logic lives in [`crate::graph`]. Non-top-level modules never enter this
//! queue — they execute as soon as the graph engine finds them ready,
//! independent of this ordering.

use std::collections::VecDeque;

use crate::specifier::Specifier;

#[derive(Default)]
pub struct TopLevelScheduler {
  queue: VecDeque<Specifier>,
}

impl TopLevelScheduler {
  pub fn enqueue(&mut self, specifier: Specifier) {
    self.queue.push_back(specifier);
  }

  pub fn front(&self) -> Option<&Specifier> {
    self.queue.front()
  }

  pub fn pop_front(&mut self) -> Option<Specifier> {
    self.queue.pop_front()
  }

  pub fn reset(&mut self) {
    self.queue.clear();
  }
}
