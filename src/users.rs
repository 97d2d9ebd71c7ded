//! Read-only user directory. Accounts are provisioned by the auth service.

use uuid::Uuid;

use crate::core_state::{require_user, CoreError};
use crate::db::CareStore;
use crate::models::enums::UserRole;
use crate::models::User;

pub fn get_user(store: &dyn CareStore, id: &Uuid) -> Result<User, CoreError> {
    require_user(store, id)
}

/// Doctors, optionally narrowed by a case-insensitive specialization substring.
pub fn list_doctors(
    store: &dyn CareStore,
    specialization: Option<&str>,
) -> Result<Vec<User>, CoreError> {
    let doctors = store.list_users_by_role(UserRole::Doctor)?;
    let needle = specialization
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let Some(needle) = needle else {
        return Ok(doctors);
    };
    Ok(doctors
        .into_iter()
        .filter(|d| {
            d.specialization
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&needle))
        })
        .collect())
}

pub fn set_active_chat(store: &dyn CareStore, user_id: &Uuid, active: bool) -> Result<(), CoreError> {
    Ok(store.set_active_chat(user_id, active)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::new_user;
    use crate::db::SqliteStore;

    fn doctor(store: &SqliteStore, name: &str, specialization: Option<&str>) -> User {
        let mut user = new_user(name, UserRole::Doctor);
        user.specialization = specialization.map(str::to_string);
        store.insert_user(&user).unwrap();
        user
    }

    #[test]
    fn specialization_filter_is_case_insensitive_substring() {
        let store = SqliteStore::open_in_memory().unwrap();
        doctor(&store, "Dr. Rao", Some("Cardiology"));
        doctor(&store, "Dr. Zhou", Some("Pediatric Cardiology"));
        doctor(&store, "Dr. Adeyemi", Some("Neurology"));
        doctor(&store, "Dr. Novak", None);

        let cardio = list_doctors(&store, Some("cardio")).unwrap();
        let names: Vec<&str> = cardio.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Dr. Rao", "Dr. Zhou"]);
    }

    #[test]
    fn blank_filter_lists_all_doctors() {
        let store = SqliteStore::open_in_memory().unwrap();
        doctor(&store, "Dr. Rao", Some("Cardiology"));
        doctor(&store, "Dr. Novak", None);
        store.insert_user(&new_user("Asha", UserRole::Patient)).unwrap();

        assert_eq!(list_doctors(&store, None).unwrap().len(), 2);
        assert_eq!(list_doctors(&store, Some("  ")).unwrap().len(), 2);
    }

    #[test]
    fn unknown_user_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            get_user(&store, &Uuid::new_v4()),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn active_chat_flag_round_trips() {
        let store = SqliteStore::open_in_memory().unwrap();
        let patient = new_user("Asha", UserRole::Patient);
        store.insert_user(&patient).unwrap();
        set_active_chat(&store, &patient.id, true).unwrap();
        assert!(get_user(&store, &patient.id).unwrap().has_active_chat);
    }
}
