//! Initial catalog content for a fresh database.

use serde_json::json;

use crate::record::Record;

/// Records destined for one collection.
#[derive(Debug, Clone)]
pub struct SeedCollection {
    pub name: &'static str,
    pub records: Vec<Record>,
}

/// The admin login created by `populate` when absent. The password is
/// already hashed.
#[derive(Debug, Clone)]
pub struct AdminCredential {
    pub username: String,
    pub password_hash: String,
}

fn collection(name: &'static str, rows: serde_json::Value) -> Result<SeedCollection, serde_json::Error> {
    let records = serde_json::from_value::<Vec<Record>>(rows)?;
    Ok(SeedCollection { name, records })
}

/// The default catalog. Array fields are given structured; the store
/// serializes them on insert.
pub fn catalog_seed() -> Result<Vec<SeedCollection>, serde_json::Error> {
    Ok(vec![
        collection(
            "courses",
            json!([
                {
                    "id": "open-water",
                    "title": "Open Water Diver",
                    "level": "Beginner",
                    "description": "Your first certification. Learn the fundamentals of scuba in the pool and on four open water dives.",
                    "duration": "3-4 days",
                    "maxDepth": "18m",
                    "price": "$450",
                    "includes": ["Theory Sessions", "Pool Training", "4 Open Water Dives", "Certification"]
                },
                {
                    "id": "advanced-open-water",
                    "title": "Advanced Open Water",
                    "level": "Intermediate",
                    "description": "Five adventure dives including deep and navigation, building on your open water skills.",
                    "duration": "2-3 days",
                    "maxDepth": "30m",
                    "price": "$380",
                    "includes": ["Deep Dive", "Navigation Dive", "3 Adventure Dives", "Certification"]
                },
                {
                    "id": "rescue-diver",
                    "title": "Rescue Diver",
                    "level": "Advanced",
                    "description": "Learn to prevent and manage problems in the water and become a more confident buddy.",
                    "duration": "3 days",
                    "maxDepth": "30m",
                    "price": "$420",
                    "includes": ["Emergency First Response", "Rescue Scenarios", "Certification"]
                }
            ]),
        )?,
        collection(
            "excursions",
            json!([
                {
                    "id": "manta-point",
                    "title": "Manta Point",
                    "location": "South Ari Atoll",
                    "duration": "Half day",
                    "price": "$120",
                    "description": "Drift over a cleaning station visited by reef mantas year round.",
                    "image": "/images/excursions/manta-point.jpg"
                },
                {
                    "id": "whale-shark-search",
                    "title": "Whale Shark Search",
                    "location": "Maamigili",
                    "duration": "Full day",
                    "price": "$180",
                    "description": "Snorkel and dive the outer reef in search of resident whale sharks.",
                    "image": "/images/excursions/whale-shark.jpg"
                },
                {
                    "id": "night-reef",
                    "title": "Night Reef Dive",
                    "location": "House Reef",
                    "duration": "2 hours",
                    "price": "$75",
                    "description": "Hunting morays, sleeping turtles and bioluminescence after dark.",
                    "image": "/images/excursions/night-reef.jpg"
                },
                {
                    "id": "shark-thila",
                    "title": "Shark Thila",
                    "location": "Addu Atoll",
                    "duration": "Half day",
                    "price": "$110",
                    "description": "Grey reef sharks patrol this pinnacle in the morning current.",
                    "image": "/images/excursions/shark-thila.jpg"
                },
                {
                    "id": "british-loyalty",
                    "title": "British Loyalty Wreck",
                    "location": "Addu Atoll",
                    "duration": "Half day",
                    "price": "$130",
                    "description": "A WWII tanker resting at 33m, covered in soft corals.",
                    "image": "/images/excursions/british-loyalty.jpg"
                },
                {
                    "id": "turtle-garden",
                    "title": "Turtle Garden",
                    "location": "Gan",
                    "duration": "Half day",
                    "price": "$90",
                    "description": "Shallow coral gardens where green turtles feed.",
                    "image": "/images/excursions/turtle-garden.jpg"
                }
            ]),
        )?,
        collection(
            "packages",
            json!([
                {
                    "id": "discovery",
                    "name": "Discovery",
                    "price": "$250",
                    "popular": false,
                    "description": "Two guided dives for newcomers and returning divers.",
                    "features": ["2 Guided Dives", "Equipment Rental", "Boat Transfer"]
                },
                {
                    "id": "adventure",
                    "name": "Adventure",
                    "price": "$520",
                    "popular": true,
                    "description": "Six dives across our favourite sites.",
                    "features": ["6 Guided Dives", "Equipment Rental", "Boat Transfer", "Night Dive"]
                },
                {
                    "id": "explorer",
                    "name": "Explorer",
                    "price": "$890",
                    "popular": false,
                    "description": "Ten dives including the wreck and a full day trip.",
                    "features": ["10 Guided Dives", "Equipment Rental", "Wreck Dive", "Full Day Trip", "Nitrox"]
                }
            ]),
        )?,
        collection(
            "gallery",
            json!([
                { "id": "g1", "type": "photo", "alt": "Reef manta at cleaning station", "url": "/images/gallery/manta.jpg", "categories": ["Marine Life"] },
                { "id": "g2", "type": "photo", "alt": "Whale shark at the surface", "url": "/images/gallery/whale-shark.jpg", "categories": ["Marine Life"] },
                { "id": "g3", "type": "photo", "alt": "Wreck bow covered in coral", "url": "/images/gallery/wreck.jpg", "categories": ["Wrecks"] },
                { "id": "g4", "type": "photo", "alt": "Students on their first dive", "url": "/images/gallery/students.jpg", "categories": ["Courses"] },
                { "id": "g5", "type": "photo", "alt": "Green turtle over the reef", "url": "/images/gallery/turtle.jpg", "categories": ["Marine Life", "Reefs"] },
                { "id": "g6", "type": "photo", "alt": "Dive boat at sunset", "url": "/images/gallery/boat.jpg", "categories": ["Island Life"] },
                { "id": "g7", "type": "photo", "alt": "Grey reef sharks on the thila", "url": "/images/gallery/sharks.jpg", "categories": ["Marine Life"] },
                { "id": "g8", "type": "photo", "alt": "Soft coral wall", "url": "/images/gallery/coral.jpg", "categories": ["Reefs"] }
            ]),
        )?,
        collection(
            "reviews",
            json!([
                {
                    "id": "r1",
                    "name": "Anna",
                    "country": "Germany",
                    "rating": 5,
                    "text": "Patient instructors and unforgettable dives with mantas.",
                    "course": "Open Water Diver"
                },
                {
                    "id": "r2",
                    "name": "Kenji",
                    "country": "Japan",
                    "rating": 5,
                    "text": "The wreck dive was the highlight of our trip.",
                    "course": "Advanced Open Water"
                },
                {
                    "id": "r3",
                    "name": "Maria",
                    "country": "Italy",
                    "rating": 4,
                    "text": "Great team, well maintained equipment.",
                    "course": "Rescue Diver"
                }
            ]),
        )?,
        collection(
            "team",
            json!([
                { "id": "t1", "name": "Ahmed", "role": "Course Director", "image": "/images/team/ahmed.jpg" },
                { "id": "t2", "name": "Sara", "role": "Instructor", "image": "/images/team/sara.jpg" },
                { "id": "t3", "name": "Ibrahim", "role": "Divemaster", "image": "/images/team/ibrahim.jpg" }
            ]),
        )?,
        collection(
            "services",
            json!([
                { "id": "s1", "name": "Equipment Rental", "description": "Full sets serviced after every trip." },
                { "id": "s2", "name": "Nitrox Fills", "description": "EAN32 for certified divers." },
                { "id": "s3", "name": "Boat Transfers", "description": "Daily departures to all sites." },
                { "id": "s4", "name": "Underwater Photography", "description": "Camera rental and photo packages." },
                { "id": "s5", "name": "Private Guiding", "description": "One to one dives at your own pace." }
            ]),
        )?,
    ])
}
