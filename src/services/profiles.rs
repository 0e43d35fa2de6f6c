use sqlx::SqlitePool;
use tracing::info;

use crate::db::{profiles, tickets};
use crate::models::{Profile, ProfileDetail};
use crate::utils::error::{is_unique_violation, AppError};

pub const MAX_NAME_LEN: usize = 100;

fn normalize_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Profile name is required.".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "Profile name must be at most {MAX_NAME_LEN} characters."
        )));
    }
    Ok(name)
}

fn duplicate_name() -> AppError {
    AppError::Conflict("Profile with this name already exists.".to_string())
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Profile {id} not found"))
}

pub async fn list_profiles(pool: &SqlitePool) -> Result<Vec<Profile>, AppError> {
    Ok(profiles::list(pool).await?)
}

pub async fn get_profile(pool: &SqlitePool, id: i64) -> Result<ProfileDetail, AppError> {
    let profile = profiles::find(pool, id).await?.ok_or_else(|| not_found(id))?;
    let tickets = tickets::list_for_profile(pool, id).await?;
    Ok(ProfileDetail { profile, tickets })
}

pub async fn create_profile(pool: &SqlitePool, name: &str) -> Result<Profile, AppError> {
    let name = normalize_name(name)?;
    if profiles::find_by_name(pool, name).await?.is_some() {
        return Err(duplicate_name());
    }

    let profile = profiles::insert(pool, name).await.map_err(|e| {
        if is_unique_violation(&e) {
            duplicate_name()
        } else {
            e.into()
        }
    })?;
    info!(profile_id = profile.id, name = %profile.name, "Profile created");
    Ok(profile)
}

pub async fn rename_profile(pool: &SqlitePool, id: i64, name: &str) -> Result<Profile, AppError> {
    let name = normalize_name(name)?;
    if profiles::find(pool, id).await?.is_none() {
        return Err(not_found(id));
    }
    if let Some(existing) = profiles::find_by_name(pool, name).await? {
        if existing.id != id {
            return Err(duplicate_name());
        }
    }

    let profile = profiles::rename(pool, id, name)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_name()
            } else {
                e.into()
            }
        })?
        .ok_or_else(|| not_found(id))?;
    info!(profile_id = id, name = %profile.name, "Profile renamed");
    Ok(profile)
}

/// Deletes the profile and all of its tickets. Returns the removed profile
/// and how many tickets went with it.
///
/// The transaction opens with a write so it takes the write lock up front.
pub async fn delete_profile(pool: &SqlitePool, id: i64) -> Result<(Profile, u64), AppError> {
    let mut tx = pool.begin().await?;
    let removed = tickets::delete_for_profile(&mut *tx, id).await?;
    // dropping the transaction rolls back
    let profile = profiles::delete(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tx.commit().await?;

    info!(profile_id = id, name = %profile.name, tickets = removed, "Profile deleted");
    Ok((profile, removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::pool;

    #[tokio::test]
    async fn test_create_trims_and_rejects_empty() {
        let pool = pool().await;
        let profile = create_profile(&pool, "  kids ").await.unwrap();
        assert_eq!(profile.name, "kids");

        for bad in ["", "   "] {
            let err = create_profile(&pool, bad).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
        let err = create_profile(&pool, &"x".repeat(MAX_NAME_LEN + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_duplicate_names_conflict() {
        let pool = pool().await;
        create_profile(&pool, "kids").await.unwrap();
        let adults = create_profile(&pool, "adults").await.unwrap();

        let err = create_profile(&pool, "kids").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = rename_profile(&pool, adults.id, "kids").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_rename_to_same_name_and_new_name() {
        let pool = pool().await;
        let kids = create_profile(&pool, "kids").await.unwrap();

        let same = rename_profile(&pool, kids.id, "kids").await.unwrap();
        assert_eq!(same.name, "kids");

        let renamed = rename_profile(&pool, kids.id, "teens").await.unwrap();
        assert_eq!(renamed.name, "teens");
        assert!(renamed.updated_at >= kids.updated_at);
        assert_eq!(renamed.created_at, kids.created_at);

        let err = rename_profile(&pool, 999, "nobody").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_cascades_tickets() {
        let pool = pool().await;
        let kids = create_profile(&pool, "kids").await.unwrap();
        let other = create_profile(&pool, "other").await.unwrap();
        for (profile_id, code) in [(kids.id, "0001"), (kids.id, "0002"), (other.id, "0003")] {
            tickets::insert(&pool, profile_id, code, 10).await.unwrap();
        }

        let (deleted, removed) = delete_profile(&pool, kids.id).await.unwrap();
        assert_eq!(deleted.name, "kids");
        assert_eq!(removed, 2);

        assert!(tickets::find_info_by_lock_code(&pool, "0001")
            .await
            .unwrap()
            .is_none());
        assert!(tickets::find_info_by_lock_code(&pool, "0003")
            .await
            .unwrap()
            .is_some());
        let err = get_profile(&pool, kids.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_foreign_key_cascade_backstop() {
        let pool = pool().await;
        let kids = create_profile(&pool, "kids").await.unwrap();
        tickets::insert(&pool, kids.id, "4321", 10).await.unwrap();

        let deleted = profiles::delete(&pool, kids.id).await.unwrap();
        assert_eq!(deleted.map(|p| p.id), Some(kids.id));
        assert!(!tickets::lock_code_exists(&pool, "4321").await.unwrap());
        assert!(profiles::delete(&pool, kids.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_and_detail() {
        let pool = pool().await;
        let first = create_profile(&pool, "first").await.unwrap();
        let second = create_profile(&pool, "second").await.unwrap();
        tickets::insert(&pool, first.id, "1111", 10).await.unwrap();

        let names: Vec<String> = list_profiles(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);

        let detail = get_profile(&pool, first.id).await.unwrap();
        assert_eq!(detail.tickets.len(), 1);
        assert_eq!(detail.tickets[0].lock_code, "1111");
        assert!(get_profile(&pool, second.id).await.unwrap().tickets.is_empty());
    }
}
