//! [`Reservation`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{reservation, unit, Reservation},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `reservations` table.
const COLUMNS: &str = "\
    id, unit_id, holder_id, lead_id, note, status, \
    created_at, expires_at, resolved_at";

/// Restores a [`Reservation`] from the provided [`Row`].
fn from_row(row: &Row) -> Reservation {
    Reservation {
        id: row.get("id"),
        unit_id: row.get("unit_id"),
        holder_id: row.get("holder_id"),
        lead_id: row.get("lead_id"),
        note: row.get("note"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
        resolved_at: row.get("resolved_at"),
    }
}

impl<C> Database<Select<By<Option<Reservation>, reservation::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: reservation::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM reservations \
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

impl<C>
    Database<Select<By<Option<read::reservation::Active<Reservation>>, unit::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<read::reservation::Active<Reservation>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<read::reservation::Active<Reservation>>, unit::Id>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let unit_id: unit::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM reservations \
             WHERE unit_id = $1::UUID \
               AND status = $2::INT2 \
             ORDER BY created_at DESC \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&unit_id, &reservation::Status::Active])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| read::reservation::Active(from_row(&row))))
    }
}

impl<C> Database<Insert<Reservation>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Reservation>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(reservation): Insert<Reservation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(reservation))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Reservation>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(reservation): Update<Reservation>,
    ) -> Result<Self::Ok, Self::Err> {
        let Reservation {
            id,
            unit_id,
            holder_id,
            lead_id,
            note,
            status,
            created_at,
            expires_at,
            resolved_at,
        } = reservation;

        const SQL: &str = "\
            INSERT INTO reservations (\
                id, unit_id, holder_id, lead_id, note, status, \
                created_at, expires_at, resolved_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, $5::VARCHAR, \
                $6::INT2, \
                $7::TIMESTAMPTZ, $8::TIMESTAMPTZ, $9::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET note = EXCLUDED.note, \
                status = EXCLUDED.status, \
                expires_at = EXCLUDED.expires_at, \
                resolved_at = EXCLUDED.resolved_at";
        self.exec(
            SQL,
            &[
                &id,
                &unit_id,
                &holder_id,
                &lead_id,
                &note,
                &status,
                &created_at,
                &expires_at,
                &resolved_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
