use crate::app::generator::documents::format_currency;
use crate::domain::model::CustomerRecord;
use chrono::{Duration, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

const CITIES: [&str; 8] = [
    "Miami, FL",
    "Orlando, FL",
    "Tampa, FL",
    "Jacksonville, FL",
    "Fort Lauderdale, FL",
    "St. Petersburg, FL",
    "Naples, FL",
    "Sarasota, FL",
];

const ACCOUNT_MANAGERS: [&str; 6] = [
    "John Smith",
    "Sarah Johnson",
    "Michael Brown",
    "Emily Davis",
    "David Wilson",
    "Lisa Anderson",
];

const FIRST_NAMES: &[&str] = &[
    "James", "Emma", "William", "Olivia", "Benjamin", "Sophia", "Lucas", "Ava", "Henry",
    "Isabella", "Alexander", "Mia", "Sebastian", "Charlotte", "Jack", "Amelia", "Owen", "Harper",
    "Gabriel", "Evelyn", "Matthew", "Abigail", "Leo", "Elizabeth", "Nathan", "Sofia", "Isaac",
    "Avery", "Jayden", "Ella", "Anthony", "Scarlett", "Dylan", "Grace", "Andrew", "Victoria",
    "Joshua", "Riley", "Christopher", "Aria", "Theodore", "Lily", "Caleb", "Aubrey", "Ryan",
    "Zoey", "Asher", "Penelope", "Nathaniel", "Lillian", "Thomas", "Addison", "Layla", "Isaiah",
    "Natalie", "Charles", "Camila", "Josiah", "Chloe", "Hudson", "Samantha", "Christian", "Stella",
    "Hunter", "Violet", "Connor", "Rebecca", "Eli", "Audrey", "Ezra", "Savannah", "Aaron",
    "Allison", "Landon", "Anna", "Adrian", "Ariana", "Jonathan", "Alice", "Nolan", "Hailey",
    "Jeremiah", "Gabriella", "Easton", "Sadie", "Elias", "Arianna", "Colton", "Paisley", "Cameron",
    "Skylar", "Carson", "Nora", "Robert", "Sarah", "Angel", "Claire", "Maverick", "Quinn",
    "Nicholas", "Lucy", "Dominic", "Elena",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright", "Scott",
    "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall", "Rivera",
    "Campbell", "Mitchell", "Carter", "Roberts", "Gomez", "Phillips", "Evans", "Turner", "Diaz",
    "Parker", "Cruz", "Edwards", "Collins", "Reed", "Stewart", "Morris", "Morales", "Murphy",
    "Cook", "Rogers", "Morgan", "Peterson", "Cooper", "Bailey", "Bell", "Kelly", "Howard", "Ward",
    "Cox", "Richardson", "Wood", "Watson", "Brooks", "Bennett", "Gray", "James", "Reyes", "Hughes",
    "Price", "Myers", "Long", "Foster", "Sanders", "Ross", "Powell", "Sullivan", "Russell",
    "Ortiz", "Jenkins", "Gutierrez", "Perry", "Butler", "Barnes",
];

const INDUSTRY_PREFIXES: [&str; 3] = ["Retired -", "Former", "Ex-"];
const INDUSTRY_TYPES: [&str; 30] = [
    "Technology",
    "Finance",
    "Healthcare",
    "Manufacturing",
    "Education",
    "Government",
    "Military",
    "Business",
    "Engineering",
    "Science",
    "Law",
    "Media",
    "Construction",
    "Transportation",
    "Energy",
    "Agriculture",
    "Retail",
    "Hospitality",
    "Entertainment",
    "Telecommunications",
    "Real Estate",
    "Insurance",
    "Consulting",
    "Marketing",
    "Research",
    "Architecture",
    "Pharmaceuticals",
    "Non-Profit",
    "Utilities",
    "Automotive",
];

const JOB_PREFIXES: [&str; 3] = ["Retired", "Former", "Ex-"];
const JOB_TYPES: [&str; 20] = [
    "Executive",
    "Professional",
    "Educator",
    "Military Officer",
    "Business Owner",
    "Healthcare Professional",
    "Government Official",
    "Engineer",
    "Scientist",
    "Attorney",
    "Manager",
    "Director",
    "Consultant",
    "Analyst",
    "Architect",
    "Researcher",
    "Administrator",
    "Coordinator",
    "Specialist",
    "Supervisor",
];

/// Synthetic retirees built from fixed pools. Dates are relative to `now`.
/// Names never repeat within one factory, since each name becomes a folder.
pub struct CustomerFactory<R: Rng> {
    rng: R,
    now: NaiveDateTime,
    used_names: HashSet<String>,
}

impl<R: Rng> CustomerFactory<R> {
    pub fn new(rng: R, now: NaiveDateTime) -> Self {
        Self {
            rng,
            now,
            used_names: HashSet::new(),
        }
    }

    /// Redraws until the full name is new. Once every combination is taken
    /// the last draw is returned as-is.
    fn unique_name(&mut self) -> (&'static str, &'static str) {
        let combinations = FIRST_NAMES.len() * LAST_NAMES.len();
        let mut drawn = (self.pick(FIRST_NAMES), self.pick(LAST_NAMES));

        for _ in 0..combinations {
            if self.used_names.insert(format!("{} {}", drawn.0, drawn.1)) {
                return drawn;
            }
            drawn = (self.pick(FIRST_NAMES), self.pick(LAST_NAMES));
        }

        tracing::warn!("⚠️ Name pool exhausted, reusing {} {}", drawn.0, drawn.1);
        drawn
    }

    fn pick(&mut self, pool: &[&'static str]) -> &'static str {
        pool.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn days_ago(&mut self, min: i64, max: i64) -> NaiveDateTime {
        self.now - Duration::days(self.rng.gen_range(min..=max))
    }

    pub fn next_customer(&mut self) -> CustomerRecord {
        let (first_name, last_name) = self.unique_name();

        let retirement_date = self.days_ago(365, 365 * 15);
        let age = self.rng.gen_range(65..=85);
        let annual_revenue = format_currency(self.rng.gen_range(50_000..=200_000));
        let industry = format!("{} {}", self.pick(&INDUSTRY_PREFIXES), self.pick(&INDUSTRY_TYPES));
        let job_title = format!("{} {}", self.pick(&JOB_PREFIXES), self.pick(&JOB_TYPES));
        let phone = format!(
            "+1-{}-{}-{}",
            self.rng.gen_range(200..=999),
            self.rng.gen_range(200..=999),
            self.rng.gen_range(1000..=9999)
        );
        let city = self.pick(&CITIES).to_string();
        let account_manager = self.pick(&ACCOUNT_MANAGERS).to_string();
        let customer_id = format!("CUST-{:03}", self.rng.gen_range(100..=999));
        let created_at = self.days_ago(1, 365);
        let last_contact = self.days_ago(1, 30);

        CustomerRecord {
            name: format!("{} {}", first_name, last_name),
            email: format!(
                "{}.{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase()
            ),
            phone,
            city,
            job_title,
            industry,
            annual_revenue,
            account_manager,
            customer_id,
            created_at: created_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            last_contact: last_contact.format("%Y-%m-%d").to_string(),
            retirement_date: retirement_date.format("%Y-%m-%d").to_string(),
            age,
        }
    }

    pub fn generate(&mut self, count: usize) -> Vec<CustomerRecord> {
        (0..count).map(|_| self.next_customer()).collect()
    }

    /// Hands the rng back so document rendering continues the same sequence.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}
