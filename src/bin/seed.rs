use std::str::FromStr;

use restaurant_pos_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
};
use rust_decimal::Decimal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    seed_tables(&pool).await?;
    seed_products(&pool).await?;
    seed_clients(&pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_tables(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for n in 1..=12 {
        let description = if n > 8 { Some("Terrace") } else { None };
        sqlx::query(
            r#"
            INSERT INTO dining_tables (number, description)
            VALUES ($1, $2)
            ON CONFLICT (number) DO NOTHING
            "#,
        )
        .bind(n.to_string())
        .bind(description)
        .execute(pool)
        .await?;
    }

    println!("Seeded tables");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // (code, name, per kg, per unit, per lb); zero means not sold that way.
    let products = [
        ("SOUP01", "Chicken Soup", "0", "8.00", "0"),
        ("STK01", "Grilled Steak", "32.00", "0", "14.50"),
        ("RICE01", "Rice with Beans", "0", "5.50", "0"),
        ("SAL01", "House Salad", "0", "6.25", "0"),
        ("FISH01", "Fried Fish", "24.00", "0", "10.90"),
        ("JUICE01", "Fresh Juice", "0", "3.00", "0"),
        ("COF01", "Coffee", "0", "2.00", "0"),
    ];

    for (code, name, kg, unit, lb) in products {
        sqlx::query(
            r#"
            INSERT INTO products (code, name, price_kg, price_unit, price_lb)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(code)
        .bind(name)
        .bind(Decimal::from_str(kg)?)
        .bind(Decimal::from_str(unit)?)
        .bind(Decimal::from_str(lb)?)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_clients(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let clients = [
        ("Walk-in Customer", None, None),
        ("Maria Lopez", Some("12 Harbor St"), Some("555-0101")),
        ("Carlos Ruiz", None, Some("555-0142")),
    ];

    for (name, address, phone) in clients {
        // Clients have no natural key, so skip names that already exist.
        sqlx::query(
            r#"
            INSERT INTO clients (name, address, phone)
            SELECT $1, $2, $3
            WHERE NOT EXISTS (SELECT 1 FROM clients WHERE name = $1)
            "#,
        )
        .bind(name)
        .bind(address)
        .bind(phone)
        .execute(pool)
        .await?;
    }

    println!("Seeded clients");
    Ok(())
}
