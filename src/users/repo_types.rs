use time::Date;

use crate::store::Entity;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Option<i64>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Date,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl Entity for User {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

// Identity is the store key, not part of the value.
impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.email == other.email
            && self.first_name == other.first_name
            && self.last_name == other.last_name
            && self.birth_date == other.birth_date
            && self.address == other.address
            && self.phone == other.phone
    }
}

impl Eq for User {}
