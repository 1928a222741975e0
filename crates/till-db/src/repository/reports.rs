//! # Sales Report Repository
//!
//! Read-only aggregations over recorded sales.
//!
//! ```text
//! ┌──────────────────────┬────────────────────────────┬──────────────────────┐
//! │ Report               │ Filter                     │ Shape                │
//! ├──────────────────────┼────────────────────────────┼──────────────────────┤
//! │ sales_by_date        │ date(date) = day           │ sales + lines + sums │
//! │ sales_by_range       │ date(date) BETWEEN a AND b │ five sums            │
//! │ sales_summary        │ last 7 or 30 days          │ sales + lines        │
//! │ service_revenue_total│ sales with a service_id    │ one sum              │
//! └──────────────────────┴────────────────────────────┴──────────────────────┘
//! ```
//!
//! Days are UTC calendar days. Listings are newest first.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use till_core::report::{attach_lines, daily_totals};
use till_core::{
    ArticleLine, DailySales, Money, RangeTotals, Sale, SaleDetail, SalesSummary, ServiceLine,
    ServiceRevenue, SummaryWindow,
};

const SALE_COLUMNS: &str = r#"
    SELECT id, total_price_cents, exchange_cents, revenue_cents,
           payment_card_cents, payment_cash_cents,
           discount_type, discount_value_cents, date, service_id
    FROM sales
"#;

const ARTICLE_LINE_COLUMNS: &str = r#"
    SELECT sa.sale_id, sa.article_id, a.name, sa.quantity, sa.price_cents
    FROM sales_articles sa
    JOIN articles a ON a.id = sa.article_id
"#;

const SERVICE_LINE_COLUMNS: &str = r#"
    SELECT ss.sale_id, ss.service_id, sv.name, ss.price_cents
    FROM sales_services ss
    JOIN services sv ON sv.id = ss.service_id
"#;

/// Repository for sales reports.
#[derive(Debug, Clone)]
pub struct SalesReportRepository {
    pool: SqlitePool,
}

impl SalesReportRepository {
    /// Creates a new SalesReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalesReportRepository { pool }
    }

    /// Every sale on `day` with its lines, plus the day's totals.
    pub async fn sales_by_date(&self, day: NaiveDate) -> DbResult<DailySales> {
        debug!(%day, "Loading sales for day");

        let filter = "WHERE date(date) = ?1";
        let sales = self.load_details(filter, &[day]).await?;
        let totals = daily_totals(sales.iter().map(|detail| &detail.sale));

        Ok(DailySales { sales, totals })
    }

    /// Sums over the sales whose day falls in `start..=end`.
    ///
    /// An empty range yields all zeros.
    pub async fn sales_by_range(&self, start: NaiveDate, end: NaiveDate) -> DbResult<RangeTotals> {
        debug!(%start, %end, "Summing sales for range");

        let totals = sqlx::query_as::<_, RangeTotals>(
            r#"
            SELECT
                COALESCE(SUM(total_price_cents), 0)    AS total_price,
                COALESCE(SUM(revenue_cents), 0)        AS revenue,
                COALESCE(SUM(payment_card_cents), 0)   AS payment_card,
                COALESCE(SUM(payment_cash_cents), 0)   AS payment_cash,
                COALESCE(SUM(discount_value_cents), 0) AS total_discount
            FROM sales
            WHERE date(date) BETWEEN ?1 AND ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    /// Sales from the last 7 or 30 days, newest first.
    pub async fn sales_summary(&self, window: SummaryWindow) -> DbResult<SalesSummary> {
        self.sales_summary_at(window, Utc::now()).await
    }

    /// [`sales_summary`](Self::sales_summary) with an explicit clock.
    ///
    /// The window is `since..=now`; sales dated after `now` are left out.
    pub async fn sales_summary_at(
        &self,
        window: SummaryWindow,
        now: DateTime<Utc>,
    ) -> DbResult<SalesSummary> {
        let since = window.since(now);
        debug!(days = window.days(), %since, "Loading sales summary");

        let filter = "WHERE julianday(date) BETWEEN julianday(?1) AND julianday(?2)";
        let sales = self.load_details(filter, &[since, now]).await?;

        Ok(SalesSummary {
            days: window.days(),
            sales,
        })
    }

    /// Sum of the current price of the service behind every service use.
    pub async fn service_revenue_total(&self) -> DbResult<ServiceRevenue> {
        let cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(sv.price_cents), 0)
            FROM sales s
            JOIN services sv ON sv.id = s.service_id
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ServiceRevenue {
            total: Money::from_cents(cents),
        })
    }

    /// Loads the sales matching `filter` with their lines. `params` bind to
    /// `?1`, `?2`, ... in order.
    async fn load_details<T>(&self, filter: &str, params: &[T]) -> DbResult<Vec<SaleDetail>>
    where
        T: for<'e> sqlx::Encode<'e, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite> + Copy + Send + 'static,
    {
        let in_filter = format!("WHERE sale_id IN (SELECT id FROM sales {filter})");

        let sales_sql = format!("{SALE_COLUMNS} {filter} ORDER BY julianday(date) DESC, id DESC");
        let mut sales_query = sqlx::query_as::<_, Sale>(&sales_sql);
        for &param in params {
            sales_query = sales_query.bind(param);
        }
        let sales = sales_query.fetch_all(&self.pool).await?;

        if sales.is_empty() {
            return Ok(Vec::new());
        }

        let articles_sql = format!("{ARTICLE_LINE_COLUMNS} {in_filter} ORDER BY sa.id");
        let mut articles_query = sqlx::query_as::<_, ArticleLine>(&articles_sql);
        for &param in params {
            articles_query = articles_query.bind(param);
        }
        let articles = articles_query.fetch_all(&self.pool).await?;

        let services_sql = format!("{SERVICE_LINE_COLUMNS} {in_filter} ORDER BY ss.id");
        let mut services_query = sqlx::query_as::<_, ServiceLine>(&services_sql);
        for &param in params {
            services_query = services_query.bind(param);
        }
        let services = services_query.fetch_all(&self.pool).await?;

        debug!(
            sales = sales.len(),
            articles = articles.len(),
            services = services.len(),
            "Loaded sale details"
        );
        Ok(attach_lines(sales, articles, services))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{Duration, TimeZone};
    use till_core::{ArticleItem, Cart, CartTotals, NewArticle, NewService, ServiceItem};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let article = db
            .articles()
            .insert(
                &NewArticle {
                    name: "Shampoo".to_string(),
                    price: Money::from_cents(1000),
                    quantity: 100,
                    category: None,
                },
                "outros",
            )
            .await
            .unwrap();
        let service = db
            .services()
            .insert(
                &NewService {
                    name: "Haircut".to_string(),
                    price: Money::from_cents(2500),
                    category: None,
                },
                "outros",
            )
            .await
            .unwrap();
        (db, article.id, service.id)
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    /// A card sale of `quantity` shampoos plus, optionally, one haircut.
    fn cart(article: i64, quantity: i64, service: Option<i64>, date: DateTime<Utc>) -> Cart {
        let goods = 1000 * quantity;
        let extra = if service.is_some() { 2500 } else { 0 };
        Cart {
            article_items: vec![ArticleItem {
                article_id: article,
                quantity,
                unit_price: Money::from_cents(1000),
            }],
            service_items: service
                .map(|id| ServiceItem {
                    service_id: id,
                    unit_price: Money::from_cents(2500),
                })
                .into_iter()
                .collect(),
            totals: CartTotals {
                total_price: Money::from_cents(goods + extra),
                payment_card: Money::from_cents(goods + extra),
                discount_value: Money::from_cents(100),
                ..Default::default()
            },
            date: Some(date),
        }
    }

    fn cash_cart(article: i64, date: DateTime<Utc>) -> Cart {
        Cart {
            article_items: vec![ArticleItem {
                article_id: article,
                quantity: 1,
                unit_price: Money::from_cents(1000),
            }],
            totals: CartTotals {
                total_price: Money::from_cents(1000),
                payment_cash: Money::from_cents(2000),
                exchange: Money::from_cents(1000),
                ..Default::default()
            },
            date: Some(date),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sales_by_date_details_and_totals() {
        let (db, article, service) = setup().await;
        let morning = db.sales().record_sale(&cart(article, 2, None, at(1, 9))).await.unwrap();
        let evening = db
            .sales()
            .record_sale(&cart(article, 1, Some(service), at(1, 18)))
            .await
            .unwrap();
        let lunch = db.sales().record_sale(&cash_cart(article, at(1, 12))).await.unwrap();
        db.sales().record_sale(&cart(article, 5, None, at(2, 9))).await.unwrap();

        let report = db.reports().sales_by_date(day(1)).await.unwrap();

        let ids: Vec<i64> = report.sales.iter().map(|d| d.sale.id).collect();
        assert_eq!(ids, vec![evening, lunch, morning]);

        let evening_detail = &report.sales[0];
        assert_eq!(evening_detail.articles.len(), 1);
        assert_eq!(evening_detail.articles[0].name, "Shampoo");
        assert_eq!(evening_detail.services.len(), 1);
        assert_eq!(evening_detail.services[0].name, "Haircut");
        assert!(report.sales[1].services.is_empty());

        assert_eq!(report.totals.total_total_price.cents(), 2000 + 3500 + 1000);
        assert_eq!(report.totals.total_payment_card.cents(), 2000 + 3500);
        assert_eq!(report.totals.total_payment_cash.cents(), 2000);
        assert_eq!(report.totals.total_revenue.cents(), 1000);
    }

    #[tokio::test]
    async fn test_sales_by_date_empty_day() {
        let (db, _, _) = setup().await;

        let report = db.reports().sales_by_date(day(9)).await.unwrap();
        assert!(report.sales.is_empty());
        assert!(report.totals.total_total_price.is_zero());
        assert!(report.totals.total_revenue.is_zero());
    }

    #[tokio::test]
    async fn test_sales_by_range_is_inclusive() {
        let (db, article, _) = setup().await;
        db.sales().record_sale(&cart(article, 1, None, at(1, 23))).await.unwrap();
        db.sales().record_sale(&cart(article, 2, None, at(3, 0))).await.unwrap();
        db.sales().record_sale(&cash_cart(article, at(3, 12))).await.unwrap();
        db.sales().record_sale(&cart(article, 4, None, at(4, 0))).await.unwrap();

        let totals = db.reports().sales_by_range(day(1), day(3)).await.unwrap();
        assert_eq!(totals.total_price.cents(), 1000 + 2000 + 1000);
        assert_eq!(totals.payment_card.cents(), 3000);
        assert_eq!(totals.payment_cash.cents(), 2000);
        assert_eq!(totals.revenue.cents(), 1000);
        assert_eq!(totals.total_discount.cents(), 200);
    }

    #[tokio::test]
    async fn test_sales_by_range_empty_is_zero() {
        let (db, _, _) = setup().await;

        let totals = db.reports().sales_by_range(day(1), day(31)).await.unwrap();
        assert_eq!(totals, RangeTotals::default());
    }

    #[tokio::test]
    async fn test_sales_summary_windows() {
        let (db, article, _) = setup().await;
        let now = at(31, 12);
        let recent = db
            .sales()
            .record_sale(&cart(article, 1, None, now - Duration::days(2)))
            .await
            .unwrap();
        let older = db
            .sales()
            .record_sale(&cart(article, 1, None, now - Duration::days(20)))
            .await
            .unwrap();
        db.sales()
            .record_sale(&cart(article, 1, None, now - Duration::days(45)))
            .await
            .unwrap();
        // Dated ahead of the clock
        db.sales()
            .record_sale(&cart(article, 1, None, now + Duration::days(1)))
            .await
            .unwrap();

        let week = db.reports().sales_summary_at(SummaryWindow::Week, now).await.unwrap();
        assert_eq!(week.days, 7);
        let ids: Vec<i64> = week.sales.iter().map(|d| d.sale.id).collect();
        assert_eq!(ids, vec![recent]);
        assert_eq!(week.sales[0].articles.len(), 1);

        let month = db.reports().sales_summary_at(SummaryWindow::Month, now).await.unwrap();
        assert_eq!(month.days, 30);
        let ids: Vec<i64> = month.sales.iter().map(|d| d.sale.id).collect();
        assert_eq!(ids, vec![recent, older]);
    }

    #[tokio::test]
    async fn test_largest_amounts_sum_without_overflow() {
        let (db, article, _) = setup().await;
        for hour in [9, 15] {
            let mut big = cart(article, 1, None, at(4, hour));
            big.totals.total_price = till_core::MAX_AMOUNT;
            big.totals.payment_card = till_core::MAX_AMOUNT;
            db.sales().record_sale(&big).await.unwrap();
        }
        let expected = till_core::MAX_AMOUNT.cents() * 2;

        let totals = db.reports().sales_by_range(day(4), day(4)).await.unwrap();
        assert_eq!(totals.payment_card.cents(), expected);

        let report = db.reports().sales_by_date(day(4)).await.unwrap();
        assert_eq!(report.totals.total_payment_card.cents(), expected);
        assert_eq!(report.totals.total_total_price.cents(), expected);
    }

    #[tokio::test]
    async fn test_service_revenue_total() {
        let (db, article, service) = setup().await;
        assert!(db.reports().service_revenue_total().await.unwrap().total.is_zero());

        db.sales().use_service(service).await.unwrap();
        db.sales().use_service(service).await.unwrap();
        // A checkout line for the service is not a service use
        db.sales().record_sale(&cart(article, 1, Some(service), at(1, 9))).await.unwrap();

        let revenue = db.reports().service_revenue_total().await.unwrap();
        assert_eq!(revenue.total.cents(), 5000);
    }
}
