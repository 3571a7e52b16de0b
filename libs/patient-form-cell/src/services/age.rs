use chrono::NaiveDate;

/// Whole years between `birth_date` and `today`. A birth date still in the
/// future gives a negative age, so it never counts as adult.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    match today.years_since(birth_date) {
        Some(years) => years as i32,
        None => -(birth_date.years_since(today).unwrap_or(0) as i32) - 1,
    }
}

pub fn is_adult(age: i32, adult_age: i32) -> bool {
    age >= adult_age
}
