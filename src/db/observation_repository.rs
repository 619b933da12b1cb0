use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};

use crate::db::{DbError, ReplaceSummary, StoredObservation};
use crate::importers::rainfall::ObservationRecord;
use crate::period::TargetMonth;

pub const DEFAULT_INSERT_CHUNK_SIZE: usize = 1000;

const INSERT_COLUMNS: &str = "INSERT INTO curah_hujan_harian (\
    kabupaten, kecamatan, nama_pos, lat_long_raw, lintang, bujur, elevasi, link_peta, \
    das1, das2, das3, total_ch, hh, status_ketersediaan, tanggal, curah_hujan, status_data, raw_value) ";

#[derive(Clone)]
pub struct ObservationRepository {
    pool: PgPool,
    chunk_size: usize,
}

impl ObservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            chunk_size: DEFAULT_INSERT_CHUNK_SIZE,
        }
    }

    /// Rows per INSERT statement (18 binds per row, keep well under the 65535 bind limit)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, 3000);
        self
    }

    /// Replace every row of the target month with `records`, in one transaction
    ///
    /// The delete and the inserts commit together; on any error the
    /// transaction is dropped and rolled back, leaving the month as it was.
    #[instrument(skip(self, records), fields(month = %target, count = records.len()))]
    pub async fn replace_month(
        &self,
        target: TargetMonth,
        records: &[ObservationRecord],
    ) -> Result<ReplaceSummary, DbError> {
        debug!("Beginning transaction to replace month {}", target);
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM curah_hujan_harian
            WHERE tanggal >= $1 AND tanggal < $2
            "#,
        )
        .bind(target.first_day())
        .bind(target.next_month_first_day())
        .execute(&mut *tx)
        .await?
        .rows_affected();
        info!("Cleared {} existing rows for {}", deleted, target);

        let mut inserted = 0;
        for chunk in records.chunks(self.chunk_size) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(INSERT_COLUMNS);
            builder.push_values(chunk, |mut row, r| {
                row.push_bind(r.kabupaten.clone())
                    .push_bind(r.kecamatan.clone())
                    .push_bind(r.nama_pos.clone())
                    .push_bind(r.lat_long_raw.clone())
                    .push_bind(r.lintang)
                    .push_bind(r.bujur)
                    .push_bind(r.elevasi.clone())
                    .push_bind(r.link_peta.clone())
                    .push_bind(r.das1)
                    .push_bind(r.das2)
                    .push_bind(r.das3)
                    .push_bind(r.total_ch)
                    .push_bind(r.hh)
                    .push_bind(r.status_ketersediaan.clone())
                    .push_bind(r.tanggal)
                    .push_bind(r.curah_hujan)
                    .push_bind(r.status_data.as_str())
                    .push_bind(r.raw_value.clone());
            });

            let result = builder.build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
            debug!("Inserted chunk of {} rows", chunk.len());
        }

        tx.commit().await?;
        info!(
            "Replaced {}: {} rows deleted, {} rows inserted",
            target, deleted, inserted
        );

        Ok(ReplaceSummary { deleted, inserted })
    }

    /// All stored rows of a month, ordered by station and date
    #[instrument(skip(self), fields(month = %target))]
    pub async fn find_by_month(&self, target: TargetMonth) -> Result<Vec<StoredObservation>, DbError> {
        let rows = sqlx::query_as::<_, StoredObservation>(
            r#"
            SELECT id, kabupaten, kecamatan, nama_pos, lat_long_raw, lintang, bujur, elevasi,
                   link_peta, das1, das2, das3, total_ch, hh, status_ketersediaan, tanggal,
                   curah_hujan, status_data, raw_value, created_at
            FROM curah_hujan_harian
            WHERE tanggal >= $1 AND tanggal < $2
            ORDER BY nama_pos ASC, tanggal ASC
            "#,
        )
        .bind(target.first_day())
        .bind(target.next_month_first_day())
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} rows", rows.len());
        Ok(rows)
    }

    #[instrument(skip(self), fields(month = %target))]
    pub async fn count_by_month(&self, target: TargetMonth) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM curah_hujan_harian
            WHERE tanggal >= $1 AND tanggal < $2
            "#,
        )
        .bind(target.first_day())
        .bind(target.next_month_first_day())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
