//! Seed command: shop catalog, subscription plans and demo course content.
//!
//! Idempotent; existing rows are left alone.

use super::CommandError;

/// Seed the database.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Seeding shop catalog...");
    sqlx::query(
        "INSERT INTO shop_items (id, name, price, currency, category, hearts_per_unit, active)
         VALUES
             ('heart-refill',  'Heart Refill',    500, 'gems',  'hearts',  1, TRUE),
             ('full-hearts',   'Full Hearts',    2000, 'gems',  'hearts',  5, TRUE),
             ('streak-freeze', 'Streak Freeze',   200, 'gems',  'boosts',  0, TRUE),
             ('xp-boost',      '15-min XP Boost', 100, 'gems',  'boosts',  0, TRUE),
             ('gems-small',    'Pile of Gems',    199, 'usd',   'gems',    0, TRUE),
             ('gems-large',    'Chest of Gems',   999, 'usd',   'gems',    0, TRUE)
         ON CONFLICT (id) DO NOTHING",
    )
    .execute(&pool)
    .await?;

    tracing::info!("Seeding subscription plans...");
    sqlx::query(
        "INSERT INTO subscription_plans
             (id, name, description, price, currency, billing_period, active)
         VALUES
             ('premium-monthly', 'Premium', 'Ad-free learning with unlimited hearts',
              9.99, 'USD', 'monthly', TRUE),
             ('premium-yearly', 'Premium (Annual)', 'Ad-free learning with unlimited hearts',
              83.88, 'USD', 'yearly', TRUE)
         ON CONFLICT (id) DO NOTHING",
    )
    .execute(&pool)
    .await?;

    tracing::info!("Seeding demo course content...");
    sqlx::query(
        "INSERT INTO units (id, title, description, position)
         VALUES
             (1, 'Basics',     'Greetings and introductions', 1),
             (2, 'Food',       'Ordering and eating out',     2),
             (3, 'Travel',     'Getting around town',         3)
         ON CONFLICT (id) DO NOTHING",
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO lessons (id, unit_id, title, position, xp_reward)
         VALUES
             (1, 1, 'Hello and goodbye',  1, 10),
             (2, 1, 'Introducing people', 2, 10),
             (3, 1, 'How are you?',       3, 15),
             (4, 2, 'At the cafe',        1, 10),
             (5, 2, 'At the market',      2, 15),
             (6, 3, 'Asking directions',  1, 15)
         ON CONFLICT (id) DO NOTHING",
    )
    .execute(&pool)
    .await?;

    // Seeding with explicit ids leaves the serial sequences behind.
    for table in ["units", "lessons"] {
        sqlx::query(&format!(
            "SELECT setval(pg_get_serial_sequence('{table}', 'id'), (SELECT MAX(id) FROM {table}))"
        ))
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seed complete!");
    Ok(())
}
