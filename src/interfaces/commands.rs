//! JSON-lines command scripts.
//!
//! Each non-blank line is one command object tagged by `op`. Lines starting with `#` are
//! comments. Orders placed by a script may carry an `alias`; later commands can name the
//! order by that alias instead of its generated number.

use crate::application::admin::StatusUpdate;
use crate::application::checkout::OrderRequest;
use crate::application::engine::StoreEngine;
use crate::domain::contact::ContactRequest;
use crate::domain::order::{Order, OrderNumber};
use crate::error::{Result, StoreError};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    PlaceOrder {
        #[serde(default)]
        alias: Option<String>,
        #[serde(flatten)]
        request: OrderRequest,
    },
    ConfirmPayment {
        order: String,
        payment_method: String,
    },
    UpdateStatus {
        order: String,
        #[serde(flatten)]
        update: StatusUpdate,
    },
    Cancel {
        order: String,
    },
    Refund {
        order: String,
    },
    Contact(ContactRequest),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::PlaceOrder { .. } => "place_order",
            Command::ConfirmPayment { .. } => "confirm_payment",
            Command::UpdateStatus { .. } => "update_status",
            Command::Cancel { .. } => "cancel",
            Command::Refund { .. } => "refund",
            Command::Contact(_) => "contact",
        }
    }
}

/// Lazily parses a JSON-lines source. Yields the 1-based line number with each result.
pub fn read_commands<R: BufRead>(source: R) -> impl Iterator<Item = (usize, Result<Command>)> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let parsed = match line {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        return None;
                    }
                    serde_json::from_str(line).map_err(StoreError::from)
                }
                Err(e) => Err(StoreError::from(e)),
            };
            Some((index + 1, parsed))
        })
}

/// Applies commands to an engine, tracking script aliases.
pub struct CommandRunner<'a> {
    engine: &'a StoreEngine,
    aliases: HashMap<String, OrderNumber>,
}

impl<'a> CommandRunner<'a> {
    pub fn new(engine: &'a StoreEngine) -> Self {
        Self {
            engine,
            aliases: HashMap::new(),
        }
    }

    fn resolve(&self, reference: &str) -> Result<OrderNumber> {
        match self.aliases.get(reference.trim()) {
            Some(number) => Ok(number.clone()),
            None => OrderNumber::parse(reference),
        }
    }

    /// Runs one command. Returns the order it touched, if any.
    pub async fn run(&mut self, command: Command) -> Result<Option<Order>> {
        let order = match command {
            Command::PlaceOrder { alias, request } => {
                let order = self.engine.place_order(request).await?;
                if let Some(alias) = alias.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()) {
                    self.aliases.insert(alias, order.number().clone());
                }
                order
            }
            Command::ConfirmPayment {
                order,
                payment_method,
            } => {
                let number = self.resolve(&order)?;
                self.engine.confirm_payment(&number, &payment_method).await?
            }
            Command::UpdateStatus { order, update } => {
                let number = self.resolve(&order)?;
                self.engine.update_status(&number, update).await?
            }
            Command::Cancel { order } => {
                let number = self.resolve(&order)?;
                self.engine.cancel_order(&number).await?
            }
            Command::Refund { order } => {
                let number = self.resolve(&order)?;
                self.engine.refund_order(&number).await?
            }
            Command::Contact(request) => {
                self.engine.submit_contact(request).await?;
                return Ok(None);
            }
        };
        Ok(Some(order))
    }
}
