use crate::domain::money::Money;
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct OrderRow<'a> {
    order_number: &'a str,
    status: &'a str,
    payment_status: &'a str,
    currency: &'a str,
    items: u64,
    subtotal: Money,
    shipping: Money,
    tax: Money,
    total: Money,
    email: &'a str,
    payment_reference: &'a str,
}

#[derive(Serialize)]
struct StockRow<'a> {
    id: &'a str,
    title: &'a str,
    price: Money,
    currency: &'a str,
    stock: u32,
    sold: bool,
    active: bool,
}

/// Writes end-of-run reports as CSV.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders(&mut self, orders: &[Order]) -> Result<()> {
        for order in orders {
            self.writer.serialize(OrderRow {
                order_number: order.number().as_str(),
                status: order.status().as_str(),
                payment_status: order.payment_status().as_str(),
                currency: order.currency().code(),
                items: order.lines().iter().map(|line| u64::from(line.quantity)).sum(),
                subtotal: order.subtotal(),
                shipping: order.shipping_cost(),
                tax: order.tax(),
                total: order.total(),
                email: &order.customer.email,
                payment_reference: order.payment_reference().unwrap_or_default(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_stock(&mut self, products: &[Product]) -> Result<()> {
        for product in products {
            self.writer.serialize(StockRow {
                id: product.id.as_str(),
                title: &product.title,
                price: product.price,
                currency: product.currency.code(),
                stock: product.stock,
                sold: product.sold,
                active: product.is_active,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
