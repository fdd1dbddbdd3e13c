use crate::glossary::{Priority, SqlPatternDraft, TermDraft};
use crate::model::{
    Column, ColumnType, DiagramSnapshot, Position, Relationship, RelationshipType, Table,
};

fn col(id: &str, name: &str, column_type: ColumnType) -> Column {
    Column {
        id: id.to_string(),
        name: name.to_string(),
        column_type,
        is_primary_key: false,
        is_foreign_key: false,
        is_nullable: false,
        is_unique: false,
        default_value: None,
    }
}

fn pk(id: &str) -> Column {
    Column::primary_key(id)
}

fn unique(mut c: Column) -> Column {
    c.is_unique = true;
    c
}

fn fk(mut c: Column) -> Column {
    c.is_foreign_key = true;
    c
}

fn table(id: &str, x: f64, y: f64, columns: Vec<Column>) -> Table {
    Table {
        id: id.to_string(),
        name: id.to_string(),
        columns,
        position: Position::new(x, y),
        color: None,
    }
}

fn one_to_many(id: &str, from: (&str, &str), to: (&str, &str)) -> Relationship {
    Relationship {
        id: id.to_string(),
        kind: RelationshipType::OneToMany,
        from_table_id: from.0.to_string(),
        from_column_id: from.1.to_string(),
        to_table_id: to.0.to_string(),
        to_column_id: to.1.to_string(),
    }
}

/// users, posts, comments and tags with three one-to-many links. Ids are
/// fixed so loading twice yields the same snapshot.
pub fn sample_diagram() -> DiagramSnapshot {
    let users = table(
        "users",
        80.0,
        80.0,
        vec![
            pk("u1"),
            unique(col("u2", "username", ColumnType::Varchar)),
            unique(col("u3", "email", ColumnType::Varchar)),
            col("u4", "created_at", ColumnType::TimestampTz),
        ],
    );

    let mut body = col("p3", "body", ColumnType::Text);
    body.is_nullable = true;
    let mut published = col("p5", "published", ColumnType::Boolean);
    published.default_value = Some("false".to_string());
    let posts = table(
        "posts",
        450.0,
        80.0,
        vec![
            pk("p1"),
            col("p2", "title", ColumnType::Varchar),
            body,
            fk(col("p4", "user_id", ColumnType::Int)),
            published,
        ],
    );

    let comments = table(
        "comments",
        450.0,
        380.0,
        vec![
            pk("c1"),
            col("c2", "content", ColumnType::Text),
            fk(col("c3", "post_id", ColumnType::Int)),
            fk(col("c4", "user_id", ColumnType::Int)),
            col("c5", "created_at", ColumnType::TimestampTz),
        ],
    );

    let tags = table(
        "tags",
        80.0,
        380.0,
        vec![pk("t1"), unique(col("t2", "name", ColumnType::Varchar))],
    );

    DiagramSnapshot {
        tables: vec![users, posts, comments, tags],
        relationships: vec![
            one_to_many("r1", ("users", "u1"), ("posts", "p4")),
            one_to_many("r2", ("posts", "p1"), ("comments", "c3")),
            one_to_many("r3", ("users", "u1"), ("comments", "c4")),
        ],
        selected_table_id: None,
    }
}

pub fn sample_terms() -> Vec<TermDraft> {
    vec![
        TermDraft::new(
            "Revenue",
            "Total income generated from business operations before any deductions for expenses.",
        )
        .category("Revenue")
        .synonym("Income")
        .synonym("Sales")
        .synonym("Turnover")
        .sql_pattern(
            SqlPatternDraft::new(
                "Gross Revenue",
                "SELECT SUM(amount) AS gross_revenue FROM orders WHERE status = 'completed'",
            )
            .with_description("Total revenue before deductions"),
        )
        .sql_pattern(
            SqlPatternDraft::new(
                "Net Revenue",
                "SELECT SUM(amount - discount - refund) AS net_revenue FROM orders WHERE status = 'completed'",
            )
            .with_description("Revenue after discounts and refunds"),
        )
        .priority(Priority::P0)
        .dataset(Some("Sales DB")),
        TermDraft::new(
            "Customer Lifetime Value",
            "The total revenue a business can expect from a single customer account throughout their relationship.",
        )
        .category("Customer")
        .synonym("CLV")
        .synonym("CLTV")
        .synonym("LTV")
        .sql_pattern(
            SqlPatternDraft::new(
                "Simple CLV",
                "SELECT customer_id, SUM(amount) AS lifetime_value FROM orders GROUP BY customer_id",
            )
            .with_description("Sum of all orders per customer"),
        )
        .priority(Priority::P1)
        .dataset(Some("Sales DB")),
        TermDraft::new(
            "Churn Rate",
            "The percentage of customers who stop using a product or service during a given time period.",
        )
        .category("Customer")
        .synonym("Attrition Rate")
        .synonym("Customer Loss Rate")
        .sql_pattern(
            SqlPatternDraft::new(
                "Monthly Churn",
                "SELECT (lost_customers::float / total_customers_start) * 100 AS churn_rate FROM monthly_metrics",
            )
            .with_description("Monthly customer churn percentage"),
        )
        .priority(Priority::P1)
        .dataset(Some("Product Analytics")),
        TermDraft::new(
            "Gross Margin",
            "The difference between revenue and cost of goods sold, expressed as a percentage of revenue.",
        )
        .category("Finance")
        .synonym("Gross Profit Margin")
        .synonym("GM")
        .sql_pattern(
            SqlPatternDraft::new(
                "Gross Margin %",
                "SELECT ((revenue - cogs) / revenue) * 100 AS gross_margin FROM financial_summary",
            )
            .with_description("Gross margin as a percentage"),
        )
        .priority(Priority::P0)
        .dataset(Some("Finance DB")),
        TermDraft::new(
            "Conversion Rate",
            "The percentage of users who take a desired action out of the total number of visitors.",
        )
        .category("Marketing")
        .synonym("CVR")
        .synonym("Conversion Ratio")
        .sql_pattern(
            SqlPatternDraft::new(
                "Overall CVR",
                "SELECT (conversions::float / visits) * 100 AS conversion_rate FROM campaign_metrics",
            )
            .with_description("Overall conversion rate"),
        )
        .priority(Priority::P2)
        .dataset(Some("Marketing DB")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_diagram_is_consistent() {
        let mut snapshot = sample_diagram();
        assert_eq!(snapshot.tables.len(), 4);
        assert_eq!(snapshot.relationships.len(), 3);
        assert_eq!(snapshot.enforce_references(), 0);
    }

    #[test]
    fn test_sample_diagram_is_deterministic() {
        assert_eq!(sample_diagram(), sample_diagram());
    }

    #[test]
    fn test_sample_published_default() {
        let snapshot = sample_diagram();
        let published = snapshot.table("posts").unwrap().column("p5").unwrap();
        assert_eq!(published.default_value.as_deref(), Some("false"));
    }

    #[test]
    fn test_sample_terms() {
        let terms = sample_terms();
        assert_eq!(terms.len(), 5);
        assert_eq!(terms[0].synonyms, vec!["Income", "Sales", "Turnover"]);
        assert_eq!(terms[0].sql_patterns.len(), 2);
    }
}
