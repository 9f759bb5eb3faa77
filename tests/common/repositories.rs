use uuid::Uuid;

use postgres_transactor::{Driver, DriverResult, Executor, Row, Statement, Transactable};

use super::entities::{Order, User};

/// User repository running its queries through an Executor
pub struct UserRepository<D: Driver> {
    executor: Executor<D>,
}

impl<D: Driver> UserRepository<D> {
    pub fn new(executor: Executor<D>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &Executor<D> {
        &self.executor
    }

    pub async fn create(&self, user: &User) -> DriverResult<()> {
        let statement = Statement::new("INSERT INTO users (id, username, email) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email);
        self.executor.execute(&statement).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> DriverResult<Option<User>> {
        let statement = Statement::new("SELECT id, username, email FROM users WHERE id = $1").bind(id);
        let row = self.executor.fetch_optional(&statement).await?;
        row.map(|r| user_from_row(&r)).transpose()
    }

    pub async fn count(&self) -> DriverResult<i64> {
        let row = self
            .executor
            .fetch_one(&Statement::new("SELECT COUNT(*) as count FROM users"))
            .await?;
        row.get("count")
    }
}

fn user_from_row(row: &Row) -> DriverResult<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
    })
}

impl<D: Driver> Clone for UserRepository<D> {
    fn clone(&self) -> Self {
        Self::new(self.executor.clone())
    }
}

impl<D: Driver> Transactable<D> for UserRepository<D> {
    fn with_tx(&self, tx: &Executor<D>) -> Self {
        Self::new(tx.clone())
    }
}

/// Order repository running its queries through an Executor
pub struct OrderRepository<D: Driver> {
    executor: Executor<D>,
}

impl<D: Driver> OrderRepository<D> {
    pub fn new(executor: Executor<D>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &Executor<D> {
        &self.executor
    }

    pub async fn create(&self, order: &Order) -> DriverResult<()> {
        let statement = Statement::new(
            "INSERT INTO orders (id, user_id, product_name, amount) VALUES ($1, $2, $3, $4)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(&order.product_name)
        .bind(order.amount);
        self.executor.execute(&statement).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> DriverResult<Option<Order>> {
        let statement =
            Statement::new("SELECT id, user_id, product_name, amount FROM orders WHERE id = $1")
                .bind(id);
        let row = self.executor.fetch_optional(&statement).await?;
        row.map(|r| {
            Ok(Order {
                id: r.get("id")?,
                user_id: r.get("user_id")?,
                product_name: r.get("product_name")?,
                amount: r.get("amount")?,
            })
        })
        .transpose()
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> DriverResult<Vec<Order>> {
        let statement = Statement::new(
            "SELECT id, user_id, product_name, amount FROM orders WHERE user_id = $1 ORDER BY product_name",
        )
        .bind(user_id);
        let rows = self.executor.fetch_all(&statement).await?;
        rows.iter()
            .map(|r| {
                Ok(Order {
                    id: r.get("id")?,
                    user_id: r.get("user_id")?,
                    product_name: r.get("product_name")?,
                    amount: r.get("amount")?,
                })
            })
            .collect()
    }

    pub async fn count(&self) -> DriverResult<i64> {
        let row = self
            .executor
            .fetch_one(&Statement::new("SELECT COUNT(*) as count FROM orders"))
            .await?;
        row.get("count")
    }
}

impl<D: Driver> Clone for OrderRepository<D> {
    fn clone(&self) -> Self {
        Self::new(self.executor.clone())
    }
}

impl<D: Driver> Transactable<D> for OrderRepository<D> {
    fn with_tx(&self, tx: &Executor<D>) -> Self {
        Self::new(tx.clone())
    }
}

/// Adapter composing both repositories behind one transactional surface
pub struct Adapter<D: Driver> {
    pub users: UserRepository<D>,
    pub orders: OrderRepository<D>,
}

impl<D: Driver> Adapter<D> {
    pub fn new(users: UserRepository<D>, orders: OrderRepository<D>) -> Self {
        Self { users, orders }
    }

    /// Both repositories on the plain driver.
    pub fn plain(executor: Executor<D>) -> Self {
        Self::new(
            UserRepository::new(executor.clone()),
            OrderRepository::new(executor),
        )
    }

    pub async fn create_user(&self, user: &User) -> DriverResult<()> {
        self.users.create(user).await
    }

    pub async fn create_order(&self, order: &Order) -> DriverResult<()> {
        self.orders.create(order).await
    }
}

impl<D: Driver> Clone for Adapter<D> {
    fn clone(&self) -> Self {
        Self::new(self.users.clone(), self.orders.clone())
    }
}

impl<D: Driver> Transactable<D> for Adapter<D> {
    fn with_tx(&self, tx: &Executor<D>) -> Self {
        Self::new(self.users.with_tx(tx), self.orders.with_tx(tx))
    }
}
