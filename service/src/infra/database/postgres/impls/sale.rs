//! [`Sale`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{commission::Commission, sale, Sale},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `sales` table.
const COLUMNS: &str = "\
    id, unit_id, reservation_id, value, value_currency, note, \
    commission_percent, commission_value, \
    broker_value, company_value, partner_value, \
    created_at";

/// Restores a [`Sale`] from the provided [`Row`].
///
/// All commission shares carry the currency of the sale value.
fn from_row(row: &Row) -> Sale {
    let currency = row.get("value_currency");
    Sale {
        id: row.get("id"),
        unit_id: row.get("unit_id"),
        reservation_id: row.get("reservation_id"),
        value: Money {
            amount: row.get("value"),
            currency,
        },
        note: row.get("note"),
        commission: Commission {
            percent: row.get("commission_percent"),
            value: Money {
                amount: row.get("commission_value"),
                currency,
            },
            broker_value: Money {
                amount: row.get("broker_value"),
                currency,
            },
            company_value: Money {
                amount: row.get("company_value"),
                currency,
            },
            partner_value: Money {
                amount: row.get("partner_value"),
                currency,
            },
        },
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Sale>, sale::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Sale>, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: sale::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM sales \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| from_row(&row)))
    }
}

impl<C> Database<Insert<Sale>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sale): Insert<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        let Sale {
            id,
            unit_id,
            reservation_id,
            value,
            note,
            commission:
                Commission {
                    percent,
                    value: commission_value,
                    broker_value,
                    company_value,
                    partner_value,
                },
            created_at,
        } = sale;

        // Sales are immutable, so no upsert here.
        const SQL: &str = "\
            INSERT INTO sales (\
                id, unit_id, reservation_id, value, value_currency, note, \
                commission_percent, commission_value, \
                broker_value, company_value, partner_value, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::NUMERIC, $5::INT2, \
                $6::VARCHAR, \
                $7::NUMERIC, $8::NUMERIC, \
                $9::NUMERIC, $10::NUMERIC, $11::NUMERIC, \
                $12::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &unit_id,
                &reservation_id,
                &value.amount,
                &value.currency,
                &note,
                &percent,
                &commission_value.amount,
                &broker_value.amount,
                &company_value.amount,
                &partner_value.amount,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
