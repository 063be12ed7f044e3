//! [`Incorporation`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{incorporation, Incorporation},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `incorporations` table.
const COLUMNS: &str = "\
    id, name, commission_percent, \
    price_from, price_from_currency, \
    created_at";

/// Restores an [`Incorporation`] from the provided [`Row`].
fn from_row(row: &Row) -> Incorporation {
    Incorporation {
        id: row.get("id"),
        name: row.get("name"),
        commission_percent: row.get("commission_percent"),
        price_from: row.get::<_, Option<_>>("price_from").map(|amount| {
            Money {
                amount,
                currency: row.get("price_from_currency"),
            }
        }),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Incorporation>, incorporation::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Incorporation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Incorporation>, incorporation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: incorporation::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM incorporations \
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

impl<C> Database<Select<By<Vec<Incorporation>, read::incorporation::All>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Incorporation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Incorporation>, read::incorporation::All>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM incorporations \
             ORDER BY created_at, id",
        );
        Ok(self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Incorporation>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Update<Incorporation>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(incorporation): Insert<Incorporation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(incorporation))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Incorporation>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(incorporation): Update<Incorporation>,
    ) -> Result<Self::Ok, Self::Err> {
        let Incorporation {
            id,
            name,
            commission_percent,
            price_from,
            created_at,
        } = incorporation;

        let price_from_amount = price_from.map(|m| m.amount);
        let price_from_currency = price_from.map(|m| m.currency);

        const SQL: &str = "\
            INSERT INTO incorporations (\
                id, name, commission_percent, \
                price_from, price_from_currency, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::NUMERIC, \
                $4::NUMERIC, $5::INT2, \
                $6::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                commission_percent = EXCLUDED.commission_percent, \
                price_from = EXCLUDED.price_from, \
                price_from_currency = EXCLUDED.price_from_currency";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &commission_percent,
                &price_from_amount,
                &price_from_currency,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
