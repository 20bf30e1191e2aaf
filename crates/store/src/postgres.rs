use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::{
    Buyer, Order, OrderStatus, PaymentRecord, Product, ProductId, RecordMilestone,
    ShippingDetails, TrackingEntry, TransactionId, UserAccount,
};
use domain::{Money, PaymentMethod, PaymentStatus, Role};
use sqlx::{
    PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::{OrderStore, PaymentLedger, ProductCatalog, TrackingStore, UserDirectory},
};

const ORDER_COLUMNS: &str = "id, buyer_id, buyer_email, product_id, product_title, quantity, \
     unit_price_cents, total_price_cents, first_name, last_name, contact_number, \
     delivery_address, note, status, payment_method, payment_status, transaction_id, \
     ordered_at, approved_at";

/// PostgreSQL-backed storage implementation.
///
/// Conditional updates are single statements with the guard in the
/// WHERE clause, so concurrent callers race on the row lock instead of
/// on stale reads.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url` and wraps the pool.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let payment_method: String = row.try_get("payment_method")?;
        let payment_status: String = row.try_get("payment_status")?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            buyer: Buyer {
                id: UserId::from_uuid(row.try_get::<Uuid, _>("buyer_id")?),
                email: row.try_get("buyer_email")?,
            },
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            product_title: row.try_get("product_title")?,
            quantity: row.try_get::<i64, _>("quantity")? as u32,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            total_price: Money::from_cents(row.try_get("total_price_cents")?),
            shipping: ShippingDetails {
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                contact_number: row.try_get("contact_number")?,
                delivery_address: row.try_get("delivery_address")?,
            },
            note: row.try_get("note")?,
            status: status.parse::<OrderStatus>().map_err(StoreError::Decode)?,
            payment_method: payment_method
                .parse::<PaymentMethod>()
                .map_err(StoreError::Decode)?,
            payment_status: payment_status
                .parse::<PaymentStatus>()
                .map_err(StoreError::Decode)?,
            transaction_id: row
                .try_get::<Option<String>, _>("transaction_id")?
                .map(TransactionId::new),
            ordered_at: row.try_get("ordered_at")?,
            approved_at: row.try_get("approved_at")?,
        })
    }

    fn row_to_entry(row: PgRow) -> Result<TrackingEntry> {
        Ok(TrackingEntry {
            step: row.try_get("step")?,
            location: row.try_get("location")?,
            note: row.try_get("note")?,
            status: row.try_get("status")?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }

    /// Fetches the current status of an order, for building precise
    /// conflict errors after a conditional update matched no rows.
    async fn current_status(&self, id: OrderId) -> Result<Option<OrderStatus>> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match status {
            Some(s) => Ok(Some(s.parse::<OrderStatus>().map_err(StoreError::Decode)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, buyer_id, buyer_email, product_id, product_title, quantity,
                unit_price_cents, total_price_cents, first_name, last_name, contact_number,
                delivery_address, note, status, payment_method, payment_status, transaction_id,
                ordered_at, approved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.buyer.id.as_uuid())
        .bind(&order.buyer.email)
        .bind(order.product_id.as_str())
        .bind(&order.product_title)
        .bind(order.quantity as i64)
        .bind(order.unit_price.cents())
        .bind(order.total_price.cents())
        .bind(&order.shipping.first_name)
        .bind(&order.shipping.last_name)
        .bind(&order.shipping.contact_number)
        .bind(&order.shipping.delivery_address)
        .bind(&order.note)
        .bind(order.status.as_str())
        .bind(order.payment_method.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.transaction_id.as_ref().map(|t| t.as_str()))
        .bind(order.ordered_at)
        .bind(order.approved_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn transition_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order> {
        let sql = format!(
            r#"
            UPDATE orders
            SET status = $3,
                approved_at = CASE WHEN $3 = 'approved' THEN COALESCE(approved_at, now())
                                   ELSE approved_at END
            WHERE id = $1 AND status = $2
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(expected.as_str())
            .bind(next.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => match self.current_status(id).await? {
                Some(actual) => {
                    tracing::debug!(order_id = %id, %expected, %actual, "status transition lost");
                    Err(StoreError::StatusConflict {
                        order_id: id,
                        attempted: next,
                        actual,
                    })
                }
                None => Err(StoreError::OrderNotFound(id)),
            },
        }
    }

    async fn record_settlement(
        &self,
        id: OrderId,
        transaction_id: &TransactionId,
    ) -> Result<Order> {
        let sql = format!(
            r#"
            UPDATE orders
            SET payment_status = 'paid',
                transaction_id = $2,
                status = 'approved',
                approved_at = COALESCE(approved_at, now())
            WHERE id = $1 AND status IN ('pending', 'approved')
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(transaction_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => match self.current_status(id).await? {
                Some(actual) => Err(StoreError::StatusConflict {
                    order_id: id,
                    attempted: OrderStatus::Approved,
                    actual,
                }),
                None => Err(StoreError::OrderNotFound(id)),
            },
        }
    }
}

#[async_trait]
impl TrackingStore for PostgresStore {
    async fn append_entry(
        &self,
        order_id: OrderId,
        milestone: &RecordMilestone,
    ) -> Result<TrackingEntry> {
        let row = sqlx::query(
            r#"
            INSERT INTO trackings (order_id, step, location, note, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING step, location, note, status, recorded_at
            "#,
        )
        .bind(order_id.as_uuid())
        .bind(&milestone.step)
        .bind(&milestone.location)
        .bind(&milestone.note)
        .bind(&milestone.status)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_entry(row)
    }

    async fn entries(&self, order_id: OrderId) -> Result<Vec<TrackingEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT step, location, note, status, recorded_at
            FROM trackings
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_entry).collect()
    }
}

#[async_trait]
impl PaymentLedger for PostgresStore {
    async fn insert_payment(&self, record: &PaymentRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (transaction_id, order_id, payer_email, amount_cents, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (transaction_id) DO NOTHING
            "#,
        )
        .bind(record.transaction_id.as_str())
        .bind(record.order_id.as_uuid())
        .bind(&record.payer_email)
        .bind(record.amount.cents())
        .bind(&record.status)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn payment(&self, transaction_id: &TransactionId) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query(
            r#"
            SELECT transaction_id, order_id, payer_email, amount_cents, status, created_at
            FROM payments
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(PaymentRecord {
                transaction_id: TransactionId::new(row.try_get::<String, _>("transaction_id")?),
                order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
                payer_email: row.try_get("payer_email")?,
                amount: Money::from_cents(row.try_get("amount_cents")?),
                status: row.try_get("status")?,
                created_at: row.try_get("created_at")?,
            })),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ProductCatalog for PostgresStore {
    async fn product(&self, id: &ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, title, price_cents, quantity, moq FROM products WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Product {
                id: ProductId::new(row.try_get::<String, _>("id")?),
                title: row.try_get("title")?,
                price: Money::from_cents(row.try_get("price_cents")?),
                quantity: row.try_get::<i64, _>("quantity")? as u32,
                moq: row.try_get::<i64, _>("moq")? as u32,
            })),
            None => Ok(None),
        }
    }

    async fn reserve_stock(&self, id: &ProductId, quantity: u32) -> Result<()> {
        let result = sqlx::query(
            "UPDATE products SET quantity = quantity - $2 WHERE id = $1 AND quantity >= $2",
        )
        .bind(id.as_str())
        .bind(quantity as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Zero rows matched: either the product is missing or the stock
        // guard failed. Look again for the precise error.
        let available: Option<i64> =
            sqlx::query_scalar("SELECT quantity FROM products WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        match available {
            Some(available) => {
                tracing::debug!(product_id = %id, requested = quantity, available, "stock reservation lost");
                Err(StoreError::StockConflict {
                    product_id: id.clone(),
                    requested: quantity,
                    available: available as u32,
                })
            }
            None => Err(StoreError::ProductNotFound(id.clone())),
        }
    }

    async fn release_stock(&self, id: &ProductId, quantity: u32) -> Result<()> {
        let result = sqlx::query("UPDATE products SET quantity = quantity + $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(quantity as i64)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ProductNotFound(id.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for PostgresStore {
    async fn account(&self, email: &str) -> Result<Option<UserAccount>> {
        let row = sqlx::query(
            "SELECT id, email, role, suspended, suspend_reason FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let role: String = row.try_get("role")?;
                Ok(Some(UserAccount {
                    id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    email: row.try_get("email")?,
                    role: role.parse::<Role>().map_err(StoreError::Decode)?,
                    suspended: row.try_get("suspended")?,
                    suspend_reason: row.try_get("suspend_reason")?,
                }))
            }
            None => Ok(None),
        }
    }
}
