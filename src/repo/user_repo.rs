use crate::db::DbPool;
use crate::models::User;
use crate::schema::users;
use anyhow::Result;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Creates a new user
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `email` - The user's email address, trimmed before storing
/// * `name` - An optional display name
///
/// ### Returns
///
/// A Result containing the newly created User if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The email is already taken or the insert fails
#[instrument(skip(pool))]
pub fn create_user(pool: &DbPool, email: &str, name: Option<String>) -> Result<User> {
    let conn = &mut pool.get()?;

    let user = User::new(email.trim().to_string(), name);
    diesel::insert_into(users::table)
        .values(&user)
        .execute(conn)?;

    info!("Created user with id: {}", user.get_id());
    Ok(user)
}

/// Retrieves a user by ID
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `user_id` - The ID of the user to retrieve
///
/// ### Returns
///
/// A Result containing `Some(User)` if found, or `None` if there is no such user
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool))]
pub fn get_user(pool: &DbPool, user_id: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let user = users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?;

    debug!("User found: {}", user.is_some());
    Ok(user)
}

#[cfg(test)]
mod tests;
