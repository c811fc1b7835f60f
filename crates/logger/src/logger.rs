// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::{Actor, Addr, Context, Handler, Message};
use contrib_events::{ContributionEvent, Event, EventBus, Subscribe};
use std::marker::PhantomData;
use tracing::{error, info};

pub trait EventLogging: Event {
    fn log(&self, logger_name: &str);
}

pub struct SimpleLogger<E: EventLogging> {
    name: String,
    logged: usize,
    _p: PhantomData<E>,
}

impl<E: EventLogging> SimpleLogger<E> {
    pub fn attach(name: &str, bus: Addr<EventBus<E>>) -> Addr<Self> {
        let addr = Self {
            name: name.to_owned(),
            logged: 0,
            _p: PhantomData,
        }
        .start();
        bus.do_send(Subscribe::<E>::new("*", addr.clone().recipient()));
        info!(node=%name, "READY!");
        addr
    }
}

impl<E: EventLogging> Actor for SimpleLogger<E> {
    type Context = Context<Self>;
}

impl<E: EventLogging> Handler<E> for SimpleLogger<E> {
    type Result = ();

    fn handle(&mut self, msg: E, _: &mut Self::Context) -> Self::Result {
        msg.log(&self.name);
        self.logged += 1;
    }
}

/// Number of events logged so far
#[derive(Message)]
#[rtype(result = "usize")]
pub struct GetLoggedCount;

impl<E: EventLogging> Handler<GetLoggedCount> for SimpleLogger<E> {
    type Result = usize;

    fn handle(&mut self, _: GetLoggedCount, _: &mut Self::Context) -> Self::Result {
        self.logged
    }
}

impl EventLogging for ContributionEvent {
    fn log(&self, logger_name: &str) {
        match self {
            ContributionEvent::ContributionError { data, .. } => {
                error!(me = logger_name, err_type = ?data.err_type, "{}", data.message)
            }
            _ => match self.get_target_id() {
                Some(id) => info!(me = logger_name, evt = %self, id, "Event Broadcasted"),
                None => info!(me = logger_name, evt = %self, "Event Broadcasted"),
            },
        }
    }
}
