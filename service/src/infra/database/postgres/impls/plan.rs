//! [`Plan`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{incorporation, plan, Plan},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `plans` table.
const COLUMNS: &str = "\
    id, incorporation_id, name, bedrooms, area, \
    base_price, base_price_currency, \
    blocks_count, floors_per_block, units_per_floor, block_prefix, \
    active, price, price_currency, \
    created_at";

/// Restores a [`Plan`] from the provided [`Row`].
fn from_row(row: &Row) -> Plan {
    Plan {
        id: row.get("id"),
        incorporation_id: row.get("incorporation_id"),
        name: row.get("name"),
        bedrooms: u16::try_from(row.get::<_, i32>("bedrooms"))
            .expect("`bedrooms` overflow"),
        area: row.get("area"),
        base_price: row.get::<_, Option<_>>("base_price").map(|amount| {
            Money {
                amount,
                currency: row.get("base_price_currency"),
            }
        }),
        shape: plan::Shape {
            blocks_count: u16::try_from(row.get::<_, i32>("blocks_count"))
                .expect("`blocks_count` overflow"),
            floors_per_block: u16::try_from(
                row.get::<_, i32>("floors_per_block"),
            )
            .expect("`floors_per_block` overflow"),
            units_per_floor: u16::try_from(
                row.get::<_, i32>("units_per_floor"),
            )
            .expect("`units_per_floor` overflow"),
            block_prefix: row.get("block_prefix"),
        },
        active: row.get("active"),
        price: row.get::<_, Option<_>>("price").map(|amount| Money {
            amount,
            currency: row.get("price_currency"),
        }),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Plan>, plan::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Plan>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Plan>, plan::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: plan::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM plans \
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

impl<C> Database<Select<By<Vec<Plan>, incorporation::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Plan>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Plan>, incorporation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let incorporation_id: incorporation::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM plans \
             WHERE incorporation_id = $1::UUID \
             ORDER BY created_at, id",
        );
        Ok(self
            .query(&sql, &[&incorporation_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Plan>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Plan>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(plan): Insert<Plan>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(plan)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Plan>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(plan): Update<Plan>,
    ) -> Result<Self::Ok, Self::Err> {
        let Plan {
            id,
            incorporation_id,
            name,
            bedrooms,
            area,
            base_price,
            shape:
                plan::Shape {
                    blocks_count,
                    floors_per_block,
                    units_per_floor,
                    block_prefix,
                },
            active,
            price,
            created_at,
        } = plan;

        let bedrooms = i32::from(bedrooms);
        let blocks_count = i32::from(blocks_count);
        let floors_per_block = i32::from(floors_per_block);
        let units_per_floor = i32::from(units_per_floor);
        let base_price_amount = base_price.map(|m| m.amount);
        let base_price_currency = base_price.map(|m| m.currency);
        let price_amount = price.map(|m| m.amount);
        let price_currency = price.map(|m| m.currency);

        const SQL: &str = "\
            INSERT INTO plans (\
                id, incorporation_id, name, bedrooms, area, \
                base_price, base_price_currency, \
                blocks_count, floors_per_block, units_per_floor, \
                block_prefix, \
                active, price, price_currency, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::INT4, $5::NUMERIC, \
                $6::NUMERIC, $7::INT2, \
                $8::INT4, $9::INT4, $10::INT4, \
                $11::VARCHAR, \
                $12::BOOL, $13::NUMERIC, $14::INT2, \
                $15::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                bedrooms = EXCLUDED.bedrooms, \
                area = EXCLUDED.area, \
                base_price = EXCLUDED.base_price, \
                base_price_currency = EXCLUDED.base_price_currency, \
                blocks_count = EXCLUDED.blocks_count, \
                floors_per_block = EXCLUDED.floors_per_block, \
                units_per_floor = EXCLUDED.units_per_floor, \
                block_prefix = EXCLUDED.block_prefix, \
                active = EXCLUDED.active, \
                price = EXCLUDED.price, \
                price_currency = EXCLUDED.price_currency";
        self.exec(
            SQL,
            &[
                &id,
                &incorporation_id,
                &name,
                &bedrooms,
                &area,
                &base_price_amount,
                &base_price_currency,
                &blocks_count,
                &floors_per_block,
                &units_per_floor,
                &block_prefix,
                &active,
                &price_amount,
                &price_currency,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
