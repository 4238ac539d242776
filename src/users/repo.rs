use time::Date;

use crate::store::EntityStore;
use crate::users::repo_types::User;

pub type UserStore = EntityStore<User>;

impl EntityStore<User> {
    /// All users born between `from` and `to`, both inclusive. No ordering.
    pub fn find_by_birth_date_range(&self, from: Date, to: Date) -> Vec<User> {
        self.entities
            .iter()
            .filter(|entry| (from..=to).contains(&entry.value().birth_date))
            .map(|entry| entry.value().clone())
            .collect()
    }
}
