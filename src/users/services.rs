use std::sync::Arc;

use time::{Date, OffsetDateTime};
use tracing::{debug, warn};

use crate::error::{Details, ServiceError};
use crate::users::{repo::UserStore, repo_types::User};

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

/// Host-local date, falling back to UTC when the local offset is unknown.
impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
            .date()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

/// Subtracts whole calendar years, clamping Feb 29 to Feb 28 when the
/// target year is not a leap year.
pub fn years_before(date: Date, years: u32) -> Date {
    let Ok(years) = i32::try_from(years) else {
        return Date::MIN;
    };
    let year = date.year().saturating_sub(years);
    date.replace_year(year)
        .or_else(|_| date.replace_day(28).and_then(|d| d.replace_year(year)))
        .unwrap_or(Date::MIN)
}

pub struct UserService {
    store: Arc<UserStore>,
    min_age: u32,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(store: Arc<UserStore>, min_age: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            min_age,
            clock,
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &Arc<UserStore> {
        &self.store
    }

    /// Creates or replaces a user once the minimum-age rule holds.
    pub fn save(&self, user: User) -> Result<User, ServiceError> {
        self.check_min_age(&user)?;
        Ok(self.store.save(user))
    }

    pub fn find(&self, id: i64) -> Result<User, ServiceError> {
        self.store.find_by_id(id).ok_or_else(|| {
            debug!(id, "user not found");
            ServiceError::NotFound
        })
    }

    /// Both bounds are required and `from` must not be after `to`. Every
    /// missing bound is reported.
    pub fn find_by_birth_date_range(
        &self,
        from: Option<Date>,
        to: Option<Date>,
    ) -> Result<Vec<User>, ServiceError> {
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) if from > to => {
                return Err(ServiceError::bad_param(
                    "to, from",
                    "Parameter 'to' must not be before parameter 'from'",
                ));
            }
            (Some(from), Some(to)) => (from, to),
            (from, to) => {
                let mut details = Details::new();
                if from.is_none() {
                    details.insert("from".into(), "Parameter 'from' must be present".into());
                }
                if to.is_none() {
                    details.insert("to".into(), "Parameter 'to' must be present".into());
                }
                return Err(ServiceError::bad_request(details));
            }
        };
        Ok(self.store.find_by_birth_date_range(from, to))
    }

    /// Unlike the store, deleting an unknown id is an error here.
    pub fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.find(id)?;
        self.store.delete_by_id(id);
        Ok(())
    }

    fn check_min_age(&self, user: &User) -> Result<(), ServiceError> {
        let cutoff = years_before(self.clock.today(), self.min_age);
        if user.birth_date > cutoff {
            warn!(birth_date = %user.birth_date, %cutoff, "user below minimum age");
            return Err(ServiceError::InvalidAge);
        }
        Ok(())
    }
}

#[cfg(test)]
mod service_tests {
    use super::*;
    use time::macros::date;

    const MIN_AGE: u32 = 18;
    const TODAY: Date = date!(2024 - 06 - 01);

    fn service() -> UserService {
        UserService::new(Arc::new(UserStore::new()), MIN_AGE, Arc::new(FixedClock(TODAY)))
    }

    fn user(email: &str, birth_date: Date) -> User {
        User {
            id: None,
            email: email.into(),
            first_name: "John".into(),
            last_name: "Johnson".into(),
            birth_date,
            address: None,
            phone: None,
        }
    }

    #[test]
    fn save_accepts_user_exactly_at_min_age() {
        let svc = service();
        let saved = svc.save(user("old@mail.com", date!(2006 - 06 - 01))).unwrap();
        assert_eq!(saved.id, Some(1));
        assert_eq!(svc.store().count_all(), 1);
    }

    #[test]
    fn save_rejects_user_one_day_too_young() {
        let svc = service();
        let err = svc.save(user("young@mail.com", date!(2006 - 06 - 02))).unwrap_err();
        assert_eq!(err, ServiceError::InvalidAge);
        assert_eq!(svc.store().count_all(), 0);
    }

    #[test]
    fn min_age_scenario_range_returns_only_adult() {
        let svc = service();
        let adult = svc.save(user("old@mail.com", date!(2006 - 06 - 01))).unwrap();
        assert!(svc.save(user("young@mail.com", date!(2006 - 06 - 02))).is_err());

        let found = svc
            .find_by_birth_date_range(Some(date!(2000 - 01 - 01)), Some(date!(2010 - 01 - 01)))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, adult.id);
    }

    #[test]
    fn zero_min_age_accepts_birth_today() {
        let svc = UserService::new(Arc::new(UserStore::new()), 0, Arc::new(FixedClock(TODAY)));
        assert!(svc.save(user("baby@mail.com", TODAY)).is_ok());
        assert_eq!(
            svc.save(user("unborn@mail.com", date!(2024 - 06 - 02))),
            Err(ServiceError::InvalidAge)
        );
    }

    #[test]
    fn system_clock_is_within_a_day_of_utc() {
        let utc = OffsetDateTime::now_utc().date();
        let today = SystemClock.today();
        assert!(today >= utc.previous_day().unwrap() && today <= utc.next_day().unwrap());
    }

    #[test]
    fn years_before_clamps_leap_day() {
        assert_eq!(years_before(date!(2024 - 02 - 29), 1), date!(2023 - 02 - 28));
        assert_eq!(years_before(date!(2024 - 02 - 29), 4), date!(2020 - 02 - 29));
        assert_eq!(years_before(date!(2024 - 06 - 01), 18), date!(2006 - 06 - 01));
    }

    #[test]
    fn find_existing_returns_user() {
        let svc = service();
        let saved = svc.save(user("a@mail.com", date!(1990 - 01 - 01))).unwrap();
        assert_eq!(svc.find(saved.id.unwrap()).unwrap(), saved);
    }

    #[test]
    fn find_unknown_is_not_found() {
        assert_eq!(service().find(1), Err(ServiceError::NotFound));
    }

    #[test]
    fn range_without_bounds_reports_both() {
        let err = service().find_by_birth_date_range(None, None).unwrap_err();
        let details = err.details().unwrap();
        assert!(details.contains_key("from"));
        assert!(details.contains_key("to"));
    }

    #[test]
    fn range_missing_one_bound_reports_it() {
        let err = service()
            .find_by_birth_date_range(Some(date!(2000 - 01 - 01)), None)
            .unwrap_err();
        let details = err.details().unwrap();
        assert_eq!(details.len(), 1);
        assert!(details.contains_key("to"));
    }

    #[test]
    fn range_with_reversed_bounds_uses_combined_key() {
        let err = service()
            .find_by_birth_date_range(Some(date!(2010 - 01 - 01)), Some(date!(2000 - 01 - 01)))
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest { .. }));
        assert!(err.details().unwrap().contains_key("to, from"));
    }

    #[test]
    fn range_with_equal_bounds_is_valid() {
        let svc = service();
        svc.save(user("a@mail.com", date!(2000 - 01 - 01))).unwrap();
        let found = svc
            .find_by_birth_date_range(Some(date!(2000 - 01 - 01)), Some(date!(2000 - 01 - 01)))
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn delete_removes_existing_user() {
        let svc = service();
        let id = svc.save(user("a@mail.com", date!(1990 - 01 - 01))).unwrap().id.unwrap();
        svc.delete(id).unwrap();
        assert_eq!(svc.find(id), Err(ServiceError::NotFound));
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let svc = service();
        svc.save(user("a@mail.com", date!(1990 - 01 - 01))).unwrap();
        assert_eq!(svc.delete(42), Err(ServiceError::NotFound));
        assert_eq!(svc.store().count_all(), 1);
    }
}
