//! Static Agronomic Reference Tables
//!
//! Per-crop profile metadata attached to crop recommendations, the per-crop
//! optimal NPK ranges used by the fertilizer advisory, and the fertilizer
//! knowledge base itself. Lookups are case-insensitive and trimmed; unknown
//! crops fall back to a default entry.

use serde::Serialize;

/// Descriptive metadata attached to each recommended crop.
#[derive(Debug, Clone, Serialize)]
pub struct CropProfile {
    pub description: &'static str,
    pub season: &'static str,
    pub water_requirement: &'static str,
}

/// Inclusive (min, max) band considered agronomically sufficient.
pub type NutrientRange = (f64, f64);

/// Optimal (N, P, K) ranges for a crop, kg/ha.
#[derive(Debug, Clone, Copy)]
pub struct NpkOptimal {
    pub nitrogen: NutrientRange,
    pub phosphorus: NutrientRange,
    pub potassium: NutrientRange,
}

static CROP_PROFILES: &[(&str, CropProfile)] = &[
    ("rice", CropProfile {
        description: "Staple cereal crop ideal for wet, tropical climates with abundant water supply.",
        season: "Kharif (June–November)",
        water_requirement: "High (1200–2000 mm)",
    }),
    ("wheat", CropProfile {
        description: "Major cereal crop suited for cool, dry climates. Grows best in loamy soil.",
        season: "Rabi (November–April)",
        water_requirement: "Medium (450–650 mm)",
    }),
    ("maize", CropProfile {
        description: "Versatile cereal crop grown across varied climates. Good for rotation farming.",
        season: "Kharif / Rabi (year-round in some regions)",
        water_requirement: "Medium (500–800 mm)",
    }),
    ("cotton", CropProfile {
        description: "Cash crop requiring warm climate and black soil. Important for textile industry.",
        season: "Kharif (April–October)",
        water_requirement: "Medium (700–1300 mm)",
    }),
    ("jute", CropProfile {
        description: "Natural fiber crop that grows well in warm, humid climates with alluvial soil.",
        season: "Kharif (March–July)",
        water_requirement: "High (1500–2000 mm)",
    }),
    ("coffee", CropProfile {
        description: "Plantation crop grown in tropical highlands. Requires shade and well-drained soil.",
        season: "Year-round (harvest Nov–Feb)",
        water_requirement: "Medium (1500–2500 mm)",
    }),
    ("mungbean", CropProfile {
        description: "Short-duration pulse crop rich in protein. Suitable for intercropping.",
        season: "Kharif / Summer",
        water_requirement: "Low (300–500 mm)",
    }),
    ("lentil", CropProfile {
        description: "Cool-season pulse crop high in protein. Grows well in loamy soil.",
        season: "Rabi (October–March)",
        water_requirement: "Low (250–500 mm)",
    }),
    ("pomegranate", CropProfile {
        description: "Drought-tolerant fruit crop. Thrives in semi-arid climates.",
        season: "Year-round (3 seasons)",
        water_requirement: "Low (500–700 mm)",
    }),
    ("banana", CropProfile {
        description: "Tropical fruit crop requiring rich soil, warmth, and consistent moisture.",
        season: "Year-round",
        water_requirement: "High (1200–2200 mm)",
    }),
    ("mango", CropProfile {
        description: "King of fruits. Deep-rooted tropical tree suited for warm, dry winters.",
        season: "Summer (April–July harvest)",
        water_requirement: "Medium (600–1000 mm)",
    }),
    ("chickpea", CropProfile {
        description: "Important pulse crop for dryland farming. Fixes nitrogen in soil.",
        season: "Rabi (October–March)",
        water_requirement: "Low (200–400 mm)",
    }),
    ("kidneybeans", CropProfile {
        description: "Protein-rich legume suited for cooler hill climates.",
        season: "Kharif (June–September)",
        water_requirement: "Medium (400–700 mm)",
    }),
    ("pigeonpeas", CropProfile {
        description: "Hardy pulse crop with deep root system. Excellent for soil improvement.",
        season: "Kharif (June–November)",
        water_requirement: "Low (350–600 mm)",
    }),
    ("mothbeans", CropProfile {
        description: "Drought-resistant pulse crop native to arid regions of India.",
        season: "Kharif (July–October)",
        water_requirement: "Very Low (200–400 mm)",
    }),
    ("blackgram", CropProfile {
        description: "Short-duration pulse crop. Grows well in warm, humid conditions.",
        season: "Kharif / Rabi",
        water_requirement: "Low (300–500 mm)",
    }),
    ("coconut", CropProfile {
        description: "Tropical crop with year-round yield. Requires sandy, well-drained soil.",
        season: "Year-round",
        water_requirement: "High (1500–2500 mm)",
    }),
    ("papaya", CropProfile {
        description: "Fast-growing tropical fruit. Sensitive to waterlogging.",
        season: "Year-round (10 months to maturity)",
        water_requirement: "Medium (1000–1500 mm)",
    }),
    ("orange", CropProfile {
        description: "Citrus fruit crop. Requires warm days, cool nights, and well-drained soil.",
        season: "Winter harvest (Dec–Feb)",
        water_requirement: "Medium (600–1200 mm)",
    }),
    ("apple", CropProfile {
        description: "Temperate fruit crop requiring chilling hours. Grows in hilly regions.",
        season: "Summer–Autumn harvest",
        water_requirement: "Medium (600–800 mm)",
    }),
    ("grapes", CropProfile {
        description: "Vine fruit suited for warm, dry climates. Requires trellising support.",
        season: "Year-round (harvest Feb–May)",
        water_requirement: "Low–Medium (500–800 mm)",
    }),
    ("watermelon", CropProfile {
        description: "Summer fruit crop needing warm weather and sandy loam soil.",
        season: "Summer (Feb–June)",
        water_requirement: "Medium (400–600 mm)",
    }),
    ("muskmelon", CropProfile {
        description: "Warm-season cucurbit. Requires hot, dry climate for sweetness.",
        season: "Summer (Feb–May)",
        water_requirement: "Medium (400–600 mm)",
    }),
];

static DEFAULT_CROP_PROFILE: CropProfile = CropProfile {
    description: "A suitable crop for your soil and climate conditions.",
    season: "Consult local agricultural advisor",
    water_requirement: "Varies, check regional guidelines",
};

/// Look up the profile for a crop name (case-insensitive, trimmed).
pub fn profile_for(crop: &str) -> &'static CropProfile {
    let key = crop.trim().to_lowercase();
    CROP_PROFILES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, profile)| profile)
        .unwrap_or(&DEFAULT_CROP_PROFILE)
}

static CROP_NPK_OPTIMAL: &[(&str, NpkOptimal)] = &[
    ("rice",      NpkOptimal { nitrogen: (60.0, 120.0),  phosphorus: (30.0, 60.0), potassium: (30.0, 60.0) }),
    ("wheat",     NpkOptimal { nitrogen: (80.0, 120.0),  phosphorus: (40.0, 60.0), potassium: (30.0, 50.0) }),
    ("maize",     NpkOptimal { nitrogen: (80.0, 140.0),  phosphorus: (40.0, 70.0), potassium: (30.0, 60.0) }),
    ("cotton",    NpkOptimal { nitrogen: (60.0, 100.0),  phosphorus: (30.0, 50.0), potassium: (30.0, 50.0) }),
    ("sugarcane", NpkOptimal { nitrogen: (120.0, 200.0), phosphorus: (60.0, 80.0), potassium: (60.0, 80.0) }),
    ("potato",    NpkOptimal { nitrogen: (80.0, 120.0),  phosphorus: (50.0, 70.0), potassium: (60.0, 100.0) }),
    ("tomato",    NpkOptimal { nitrogen: (80.0, 120.0),  phosphorus: (60.0, 80.0), potassium: (60.0, 100.0) }),
    ("banana",    NpkOptimal { nitrogen: (100.0, 150.0), phosphorus: (40.0, 60.0), potassium: (100.0, 150.0) }),
    ("mango",     NpkOptimal { nitrogen: (40.0, 80.0),   phosphorus: (20.0, 40.0), potassium: (40.0, 80.0) }),
];

const DEFAULT_NPK_OPTIMAL: NpkOptimal = NpkOptimal {
    nitrogen: (60.0, 100.0),
    phosphorus: (30.0, 60.0),
    potassium: (30.0, 60.0),
};

/// Optimal NPK ranges for a crop (case-insensitive, trimmed), with the
/// default band for crops not in the table.
pub fn npk_optimal_for(crop: &str) -> NpkOptimal {
    let key = crop.trim().to_lowercase();
    CROP_NPK_OPTIMAL
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, optimal)| *optimal)
        .unwrap_or(DEFAULT_NPK_OPTIMAL)
}

/// Whether a fertilizer advisory asks the grower to add, reduce, or maintain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryAction {
    Add,
    Reduce,
    Maintain,
}

/// One entry of the fertilizer knowledge base.
#[derive(Debug, Clone, Serialize)]
pub struct FertilizerAdvisory {
    pub fertilizer: &'static str,
    pub description: &'static str,
    pub advice: &'static [&'static str],
    #[serde(rename = "type")]
    pub action: AdvisoryAction,
}

pub static HIGH_N: FertilizerAdvisory = FertilizerAdvisory {
    fertilizer: "Urea (46-0-0)",
    description: "Soil has excess nitrogen. Reduce nitrogen fertilizer application.",
    advice: &[
        "Skip nitrogen top-dressing this season",
        "Consider growing nitrogen-fixing cover crops to balance",
        "Monitor leaf color, dark green indicates excess N",
        "Excess nitrogen can delay maturity and attract pests",
    ],
    action: AdvisoryAction::Reduce,
};

pub static LOW_N: FertilizerAdvisory = FertilizerAdvisory {
    fertilizer: "Urea (46-0-0) or Ammonium Sulphate",
    description: "Soil nitrogen is deficient. Apply nitrogen-rich fertilizer.",
    advice: &[
        "Apply 40–60 kg/ha Urea in split doses",
        "First dose at sowing, second at 30 days",
        "Incorporate organic manure (FYM) at 5–10 t/ha",
        "Intercrop with legumes for natural N fixation",
    ],
    action: AdvisoryAction::Add,
};

pub static HIGH_P: FertilizerAdvisory = FertilizerAdvisory {
    fertilizer: "None (reduce phosphorus)",
    description: "Soil has excess phosphorus. Avoid phosphatic fertilizers.",
    advice: &[
        "Skip DAP/SSP application this season",
        "Excess P can block zinc and iron uptake",
        "Use zinc sulphate foliar spray if deficiency symptoms appear",
        "Avoid bone meal or rock phosphate amendments",
    ],
    action: AdvisoryAction::Reduce,
};

pub static LOW_P: FertilizerAdvisory = FertilizerAdvisory {
    fertilizer: "DAP (18-46-0) or Single Super Phosphate",
    description: "Soil phosphorus is deficient. Apply phosphatic fertilizer.",
    advice: &[
        "Apply 50–60 kg/ha DAP at sowing time",
        "Mix with organic compost for better availability",
        "Phosphorus is immobile, place it near the root zone",
        "Consider rock phosphate for acidic soils",
    ],
    action: AdvisoryAction::Add,
};

pub static HIGH_K: FertilizerAdvisory = FertilizerAdvisory {
    fertilizer: "None (reduce potassium)",
    description: "Soil potassium is adequate/excess. Reduce K application.",
    advice: &[
        "Skip Muriate of Potash (MOP) this season",
        "Excess K can interfere with Mg and Ca uptake",
        "Monitor for magnesium deficiency symptoms",
    ],
    action: AdvisoryAction::Reduce,
};

pub static LOW_K: FertilizerAdvisory = FertilizerAdvisory {
    fertilizer: "Muriate of Potash (MOP 0-0-60)",
    description: "Soil potassium is deficient. Apply potassic fertilizer.",
    advice: &[
        "Apply 40–50 kg/ha MOP at sowing/transplanting",
        "Split application: 50 % basal + 50 % top-dress",
        "Use Sulphate of Potash (SOP) for chloride-sensitive crops",
        "Wood ash is a good organic K source",
    ],
    action: AdvisoryAction::Add,
};

pub static MAINTAIN: FertilizerAdvisory = FertilizerAdvisory {
    fertilizer: "Balanced NPK (10-26-26 or 20-20-0)",
    description: "Soil nutrients are within optimal range. Apply balanced maintenance dose.",
    advice: &[
        "Apply a low-dose balanced NPK fertilizer",
        "Supplement with organic compost or vermicompost",
        "Conduct soil test again before next season",
    ],
    action: AdvisoryAction::Maintain,
};

/// Soil types the fertilizer model was trained on, in encoding order.
/// Unrecognized soil types encode as index 0.
pub static SOIL_TYPES: &[&str] = &[
    "loam", "clay", "sandy", "silt", "peat", "chalk",
    "red soil", "black soil", "alluvial", "laterite",
];

/// Encode a soil type string as a feature index.
pub fn encode_soil_type(soil_type: &str) -> usize {
    let key = soil_type.trim().to_lowercase();
    SOIL_TYPES.iter().position(|s| *s == key).unwrap_or(0)
}
