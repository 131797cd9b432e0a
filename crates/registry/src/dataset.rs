//! Built-in city table. Order matters: it is the registry iteration order.

use shared::domain::{health_score, CityId, CityRecord, Intervention, SeverityLevel};

pub struct CitySeed {
    pub id: &'static str,
    pub name: &'static str,
    pub country: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub population: u64,
    pub aqi: f64,
    pub pm25: f64,
    pub description: &'static str,
    pub is_reference: bool,
}

impl CitySeed {
    pub fn to_record(&self) -> CityRecord {
        CityRecord {
            id: CityId::from(self.id),
            name: self.name.to_string(),
            country: self.country.to_string(),
            lat: self.lat,
            lng: self.lng,
            population: self.population,
            aqi: self.aqi,
            pm25: self.pm25,
            description: self.description.to_string(),
            health_score: health_score(self.aqi),
            severity: SeverityLevel::from_aqi(self.aqi),
            is_reference: self.is_reference,
        }
    }
}

macro_rules! city {
    ($id:literal, $name:literal, $country:literal, $lat:expr, $lng:expr, $pop:expr, $aqi:expr, $pm25:expr, $desc:literal) => {
        city!($id, $name, $country, $lat, $lng, $pop, $aqi, $pm25, $desc, false)
    };
    ($id:literal, $name:literal, $country:literal, $lat:expr, $lng:expr, $pop:expr, $aqi:expr, $pm25:expr, $desc:literal, $reference:expr) => {
        CitySeed {
            id: $id,
            name: $name,
            country: $country,
            lat: $lat,
            lng: $lng,
            population: $pop,
            aqi: $aqi,
            pm25: $pm25,
            description: $desc,
            is_reference: $reference,
        }
    };
}

pub const CITY_SEEDS: &[CitySeed] = &[
    // reference points
    city!("north_pole", "North Pole", "Arctic", 90.0, 0.0, 0, 1.0, 0.1, "Global Zero Point. The baseline for clean air.", true),
    city!("south_pole", "South Pole", "Antarctica", -90.0, 0.0, 1_000, 1.0, 0.1, "The Frozen Sanctuary. Earth's cleanest atmosphere.", true),
    // asia
    city!("delhi", "Delhi", "India", 28.6139, 77.2090, 32_000_000, 350.0, 210.0, "The Smog Titan. Severe seasonal spikes."),
    city!("beijing", "Beijing", "China", 39.9042, 116.4074, 21_500_000, 145.0, 55.0, "The Grey Giant. Historic battles with smog."),
    city!("tokyo", "Tokyo", "Japan", 35.6762, 139.6503, 14_000_000, 35.0, 10.0, "The Neon Clean. Efficient regulation."),
    city!("mumbai", "Mumbai", "India", 19.0760, 72.8777, 20_000_000, 160.0, 70.0, "Coastal Haze. Construction dust meets sea breeze."),
    city!("bangkok", "Bangkok", "Thailand", 13.7563, 100.5018, 10_500_000, 120.0, 45.0, "Traffic gridlock trap."),
    city!("seoul", "Seoul", "South Korea", 37.5665, 126.9780, 9_700_000, 90.0, 35.0, "Transboundary dust issues."),
    city!("jakarta", "Jakarta", "Indonesia", -6.2088, 106.8456, 10_500_000, 170.0, 85.0, "Heavy vehicle emissions."),
    city!("hanoi", "Hanoi", "Vietnam", 21.0285, 105.8542, 8_000_000, 180.0, 90.0, "Dense motorbike fumes."),
    city!("singapore", "Singapore", "Singapore", 1.3521, 103.8198, 5_700_000, 45.0, 15.0, "Green city planning."),
    city!("dhaka", "Dhaka", "Bangladesh", 23.8103, 90.4125, 21_000_000, 280.0, 160.0, "Brick kilns and dust."),
    city!("karachi", "Karachi", "Pakistan", 24.8607, 67.0011, 16_000_000, 220.0, 110.0, "Industrial pollution."),
    city!("shanghai", "Shanghai", "China", 31.2304, 121.4737, 26_300_000, 110.0, 40.0, "Port and industry."),
    // americas
    city!("san_antonio", "San Antonio", "USA", 29.4241, -98.4936, 1_500_000, 45.0, 12.0, "The Northern Mirror. Clean plains."),
    city!("new_york", "New York City", "USA", 40.7128, -74.0060, 8_400_000, 48.0, 12.0, "Atlantic ventilation."),
    city!("los_angeles", "Los Angeles", "USA", 34.0522, -118.2437, 3_900_000, 85.0, 25.0, "The Smog Bowl."),
    city!("mexico_city", "Mexico City", "Mexico", 19.4326, -99.1332, 9_200_000, 130.0, 48.0, "High altitude trap."),
    city!("sao_paulo", "São Paulo", "Brazil", -23.5558, -46.6396, 12_300_000, 95.0, 33.0, "Industrial giant."),
    city!("santiago", "Santiago", "Chile", -33.4489, -70.6693, 6_000_000, 110.0, 38.0, "Valley inversion layer."),
    city!("lima", "Lima", "Peru", -12.0464, -77.0428, 10_000_000, 100.0, 35.0, "Desert coast humidity."),
    city!("bogota", "Bogota", "Colombia", 4.7110, -74.0721, 7_400_000, 65.0, 20.0, "High Andean air."),
    city!("vancouver", "Vancouver", "Canada", 49.2827, -123.1207, 675_000, 25.0, 6.0, "Pacific rainforest air."),
    city!("antipode", "Easter Island", "Chile", -27.1127, -109.3497, 7_750, 15.0, 4.0, "The Pristine Void."),
    city!("buenos_aires", "Buenos Aires", "Argentina", -34.6037, -58.3816, 2_900_000, 50.0, 14.0, "River plate winds."),
    // europe
    city!("london", "London", "UK", 51.5074, -0.1278, 9_000_000, 55.0, 14.0, "Congestion controlled."),
    city!("paris", "Paris", "France", 48.8566, 2.3522, 2_100_000, 60.0, 16.0, "Diesel reduction efforts."),
    city!("berlin", "Berlin", "Germany", 52.5200, 13.4050, 3_600_000, 50.0, 13.0, "Green zones active."),
    city!("moscow", "Moscow", "Russia", 55.7558, 37.6173, 12_500_000, 70.0, 20.0, "Mega-city traffic."),
    city!("rome", "Rome", "Italy", 41.9028, 12.4964, 2_800_000, 65.0, 18.0, "Historic congestion."),
    city!("oslo", "Oslo", "Norway", 59.9139, 10.7522, 634_000, 20.0, 5.0, "EV capital."),
    city!("reykjavik", "Reykjavik", "Iceland", 64.1466, -21.9426, 130_000, 10.0, 2.0, "Geothermal purity."),
    city!("istanbul", "Istanbul", "Turkey", 41.0082, 28.9784, 15_000_000, 90.0, 30.0, "Crossroads traffic."),
    // middle east & africa
    city!("cairo", "Cairo", "Egypt", 30.0444, 31.2357, 10_000_000, 180.0, 90.0, "Desert dust mixed with exhaust."),
    city!("dubai", "Dubai", "UAE", 25.2048, 55.2708, 3_100_000, 140.0, 65.0, "Sand and sun."),
    city!("riyadh", "Riyadh", "Saudi Arabia", 24.7136, 46.6753, 7_000_000, 155.0, 75.0, "Arid particulate matter."),
    city!("tehran", "Tehran", "Iran", 35.6892, 51.3890, 8_700_000, 160.0, 60.0, "Mountain trapped smog."),
    city!("tel_aviv", "Tel Aviv", "Israel", 32.0853, 34.7818, 435_000, 60.0, 18.0, "Mediterranean breeze."),
    city!("lagos", "Lagos", "Nigeria", 6.5244, 3.3792, 14_800_000, 190.0, 100.0, "Generator emissions."),
    city!("johannesburg", "Johannesburg", "South Africa", -26.2041, 28.0473, 5_600_000, 85.0, 28.0, "Mining dust."),
    city!("nairobi", "Nairobi", "Kenya", -1.2921, 36.8219, 4_400_000, 75.0, 22.0, "Traffic heavy."),
    // oceania
    city!("sydney", "Sydney", "Australia", -33.8688, 151.2093, 5_300_000, 30.0, 8.0, "Pacific winds."),
    city!("melbourne", "Melbourne", "Australia", -37.8136, 144.9631, 5_000_000, 28.0, 7.0, "Southern ocean air."),
    city!("auckland", "Auckland", "New Zealand", -36.8485, 174.7633, 1_600_000, 20.0, 5.0, "Windy isles."),
];

/// Scenario levers offered to the user in scenario mode.
pub fn intervention_catalog() -> Vec<Intervention> {
    vec![
        Intervention::new("vehicles", 30.0, "Deploy EV Fleet"),
        Intervention::new("industry", 50.0, "Install Sky Scrubbers"),
        Intervention::new("crop_burning", 80.0, "Agri-Waste Converter"),
        Intervention::new("green_cover", 15.0, "Urban Reforestation"),
    ]
}
