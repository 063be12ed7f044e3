//! [`Unit`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{incorporation, plan, unit, Unit},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `units` table.
const COLUMNS: &str = "\
    id, incorporation_id, plan_id, code, \
    tower, floor, stack, \
    bedrooms, area, list_price, list_price_currency, \
    status, reserved_by, reservation_expires_at, \
    created_at";

/// Restores a [`Unit`] from the provided [`Row`].
fn from_row(row: &Row) -> Unit {
    Unit {
        id: row.get("id"),
        incorporation_id: row.get("incorporation_id"),
        plan_id: row.get("plan_id"),
        code: row.get("code"),
        tower: row.get("tower"),
        floor: row.get("floor"),
        stack: row.get("stack"),
        bedrooms: u16::try_from(row.get::<_, i32>("bedrooms"))
            .expect("`bedrooms` overflow"),
        area: row.get("area"),
        list_price: row.get::<_, Option<_>>("list_price").map(|amount| {
            Money {
                amount,
                currency: row.get("list_price_currency"),
            }
        }),
        status: row.get("status"),
        reserved_by: row.get("reserved_by"),
        reservation_expires_at: row.get("reservation_expires_at"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Unit>, unit::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Unit>, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: unit::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM units \
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

impl<C> Database<Select<By<Vec<Unit>, incorporation::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Unit>, incorporation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let incorporation_id: incorporation::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM units \
             WHERE incorporation_id = $1::UUID \
             ORDER BY tower NULLS FIRST, floor, stack, id",
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

impl<C> Database<Select<By<Vec<Unit>, plan::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Unit>, plan::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let plan_id: plan::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM units \
             WHERE plan_id = $1::UUID \
             ORDER BY tower NULLS FIRST, floor, stack, id",
        );
        Ok(self
            .query(&sql, &[&plan_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<unit::code::CodeSet, incorporation::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = unit::code::CodeSet;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<unit::code::CodeSet, incorporation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let incorporation_id: incorporation::Id = by.into_inner();

        const SQL: &str = "\
            SELECT code \
            FROM units \
            WHERE incorporation_id = $1::UUID";
        Ok(self
            .query(SQL, &[&incorporation_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get::<_, unit::Code>("code"))
            .collect())
    }
}

impl<C> Database<Select<By<read::unit::Towers, incorporation::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::unit::Towers;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::unit::Towers, incorporation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let incorporation_id: incorporation::Id = by.into_inner();

        const SQL: &str = "\
            SELECT DISTINCT tower \
            FROM units \
            WHERE incorporation_id = $1::UUID \
            ORDER BY tower NULLS FIRST";
        Ok(read::unit::Towers(
            self.query(SQL, &[&incorporation_id])
                .await
                .map_err(tracerr::wrap!())?
                .into_iter()
                .map(|row| row.get("tower"))
                .collect(),
        ))
    }
}

impl<C> Database<Lock<By<Option<Unit>, unit::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Option<Unit>, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: unit::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM units \
             WHERE id = $1::UUID \
             LIMIT 1 \
             FOR UPDATE",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| from_row(&row)))
    }
}

impl<C> Database<Lock<By<Vec<Unit>, read::unit::Group>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vec<Unit>, read::unit::Group>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::unit::Group {
            incorporation_id,
            tower,
            floor,
        } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM units \
             WHERE incorporation_id = $1::UUID \
               AND tower IS NOT DISTINCT FROM $2::VARCHAR \
               AND floor = $3::INT2 \
             ORDER BY stack, id \
             FOR UPDATE",
        );
        Ok(self
            .query(&sql, &[&incorporation_id, &tower, &floor])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Vec<Unit>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(units): Insert<Vec<Unit>>,
    ) -> Result<Self::Ok, Self::Err> {
        if units.is_empty() {
            return Ok(());
        }

        let mut ids = Vec::with_capacity(units.len());
        let mut incorporation_ids = Vec::with_capacity(units.len());
        let mut plan_ids = Vec::with_capacity(units.len());
        let mut codes = Vec::with_capacity(units.len());
        let mut towers = Vec::with_capacity(units.len());
        let mut floors = Vec::with_capacity(units.len());
        let mut stacks = Vec::with_capacity(units.len());
        let mut bedrooms = Vec::with_capacity(units.len());
        let mut areas = Vec::with_capacity(units.len());
        let mut list_prices = Vec::with_capacity(units.len());
        let mut list_price_currencies = Vec::with_capacity(units.len());
        let mut statuses = Vec::with_capacity(units.len());
        let mut reserved_bys = Vec::with_capacity(units.len());
        let mut reservation_expires_ats = Vec::with_capacity(units.len());
        let mut created_ats = Vec::with_capacity(units.len());
        for unit in units {
            ids.push(unit.id);
            incorporation_ids.push(unit.incorporation_id);
            plan_ids.push(unit.plan_id);
            codes.push(unit.code);
            towers.push(unit.tower);
            floors.push(unit.floor);
            stacks.push(unit.stack);
            bedrooms.push(i32::from(unit.bedrooms));
            areas.push(unit.area);
            list_prices.push(unit.list_price.map(|m| m.amount));
            list_price_currencies.push(unit.list_price.map(|m| m.currency));
            statuses.push(unit.status);
            reserved_bys.push(unit.reserved_by);
            reservation_expires_ats.push(unit.reservation_expires_at);
            created_ats.push(unit.created_at);
        }
        const SQL: &str = "\
            INSERT INTO units (\
                id, incorporation_id, plan_id, code, \
                tower, floor, stack, \
                bedrooms, area, list_price, list_price_currency, \
                status, reserved_by, reservation_expires_at, \
                created_at \
            ) \
            SELECT * FROM UNNEST(\
                $1::UUID[], $2::UUID[], $3::UUID[], $4::VARCHAR[], \
                $5::VARCHAR[], $6::INT2[], $7::VARCHAR[], \
                $8::INT4[], $9::NUMERIC[], $10::NUMERIC[], $11::INT2[], \
                $12::INT2[], $13::UUID[], $14::TIMESTAMPTZ[], \
                $15::TIMESTAMPTZ[] \
            )";
        self.exec(
            SQL,
            &[
                &ids,
                &incorporation_ids,
                &plan_ids,
                &codes,
                &towers,
                &floors,
                &stacks,
                &bedrooms,
                &areas,
                &list_prices,
                &list_price_currencies,
                &statuses,
                &reserved_bys,
                &reservation_expires_ats,
                &created_ats,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Unit>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(unit): Update<Unit>,
    ) -> Result<Self::Ok, Self::Err> {
        let Unit {
            id,
            incorporation_id,
            plan_id,
            code,
            tower,
            floor,
            stack,
            bedrooms,
            area,
            list_price,
            status,
            reserved_by,
            reservation_expires_at,
            created_at,
        } = unit;

        let bedrooms = i32::from(bedrooms);
        let list_price_amount = list_price.map(|m| m.amount);
        let list_price_currency = list_price.map(|m| m.currency);

        const SQL: &str = "\
            INSERT INTO units (\
                id, incorporation_id, plan_id, code, \
                tower, floor, stack, \
                bedrooms, area, list_price, list_price_currency, \
                status, reserved_by, reservation_expires_at, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::VARCHAR, \
                $5::VARCHAR, $6::INT2, $7::VARCHAR, \
                $8::INT4, $9::NUMERIC, $10::NUMERIC, $11::INT2, \
                $12::INT2, $13::UUID, $14::TIMESTAMPTZ, \
                $15::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET plan_id = EXCLUDED.plan_id, \
                code = EXCLUDED.code, \
                tower = EXCLUDED.tower, \
                floor = EXCLUDED.floor, \
                stack = EXCLUDED.stack, \
                bedrooms = EXCLUDED.bedrooms, \
                area = EXCLUDED.area, \
                list_price = EXCLUDED.list_price, \
                list_price_currency = EXCLUDED.list_price_currency, \
                status = EXCLUDED.status, \
                reserved_by = EXCLUDED.reserved_by, \
                reservation_expires_at = EXCLUDED.reservation_expires_at";
        self.exec(
            SQL,
            &[
                &id,
                &incorporation_id,
                &plan_id,
                &code,
                &tower,
                &floor,
                &stack,
                &bedrooms,
                &area,
                &list_price_amount,
                &list_price_currency,
                &status,
                &reserved_by,
                &reservation_expires_at,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
