#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use dialkit::prelude::*;

/// Collects everything a listener receives
#[derive(Clone, Default)]
pub struct Recorder<T> {
    items: Rc<RefCell<Vec<T>>>,
}

impl<T: Clone + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            items: Rc::new(RefCell::new(vec![])),
        }
    }

    pub fn push(&self, item: T) {
        self.items.borrow_mut().push(item);
    }

    pub fn items(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }
}

pub fn card_config() -> DialConfig {
    parse_from_str(
        r##"
blur: [24, 0, 100]
opacity: [0.5, 0, 1, 0.05]
visible: true
tint: "#ff5500"
title: Card
version: 2
shadow:
  offset: [4, 0, 20, 1]
  color: { type: color, default: "#000" }
motion: { type: spring, visualDuration: 0.3, bounce: 0.2 }
mode: { type: select, options: [fast, slow], default: slow }
reset: { type: action, label: Reset }
"##,
    )
    .unwrap()
}
