//! In-memory fake of the Brickset v3 API.
//!
//! Every endpoint is `POST /api/v3.asmx/{route}` with a form body, answered
//! with the same `{"status": ...}` envelope the real service uses. Domain
//! failures are HTTP 200 with an `error` envelope; only unknown routes get a
//! non-2xx status.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Form, Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const API_ROOT: &str = "/api/v3.asmx";
pub const DEMO_API_KEY: &str = "test-api-key";
pub const DEMO_USERNAME: &str = "brickfan";
pub const DEMO_PASSWORD: &str = "hunter2";
pub const DEMO_USER_HASH: &str = "hash-brickfan";

const ROUTES: &[&str] = &[
    "checkKey",
    "checkUserHash",
    "getKeyUsageStats",
    "login",
    "getSets",
    "getAdditionalImages",
    "getInstructions",
    "getInstructions2",
    "getReviews",
    "getThemes",
    "getSubthemes",
    "getYears",
    "setCollection",
    "getMinifigCollection",
    "setMinifigCollection",
    "getUserNotes",
    "getUserMinifigNotes",
];

const DEFAULT_PAGE_SIZE: usize = 20;

/// A catalog set plus the per-set lists served by the lookup endpoints.
#[derive(Clone, Debug)]
pub struct CatalogSet {
    pub set_id: u32,
    pub number: &'static str,
    pub variant: u32,
    pub name: &'static str,
    pub year: u32,
    pub theme: &'static str,
    pub subtheme: &'static str,
    pub pieces: u32,
    pub tags: &'static [&'static str],
    pub instructions: &'static [&'static str],
    pub reviews: &'static [(&'static str, &'static str, u32)],
}

impl CatalogSet {
    fn full_number(&self) -> String {
        format!("{}-{}", self.number, self.variant)
    }

    fn to_json(&self, entry: Option<&SetEntry>, extended: bool) -> Value {
        let number = self.full_number();
        let mut set = json!({
            "setID": self.set_id,
            "number": self.number,
            "numberVariant": self.variant,
            "name": self.name,
            "year": self.year,
            "theme": self.theme,
            "subtheme": self.subtheme,
            "category": "Normal",
            "released": true,
            "pieces": self.pieces,
            "image": {
                "thumbnailURL": format!("https://images.brickset.com/sets/small/{number}.jpg"),
                "imageURL": format!("https://images.brickset.com/sets/images/{number}.jpg"),
            },
            "bricksetURL": format!("https://brickset.com/sets/{number}"),
            "collection": entry.map(SetEntry::to_json).unwrap_or_else(|| json!({ "notes": "" })),
            "reviewCount": self.reviews.len(),
            "instructionsCount": self.instructions.len(),
            "additionalImageCount": 2,
            "lastUpdated": "2024-01-15T09:30:00Z",
        });
        if extended {
            set["extendedData"] = json!({
                "notes": "",
                "tags": self.tags,
                "description": format!("{} from the {} theme.", self.name, self.theme),
            });
        }
        set
    }
}

pub fn catalog() -> Vec<CatalogSet> {
    vec![
        CatalogSet {
            set_id: 29_813,
            number: "10270",
            variant: 1,
            name: "Bookshop",
            year: 2020,
            theme: "Creator Expert",
            subtheme: "Modular Buildings Collection",
            pieces: 2504,
            tags: &["Modular", "Bookshop"],
            instructions: &["Book 1", "Book 2"],
            reviews: &[("huwmilward", "A worthy modular", 5)],
        },
        CatalogSet {
            set_id: 26_725,
            number: "75192",
            variant: 1,
            name: "Millennium Falcon",
            year: 2017,
            theme: "Star Wars",
            subtheme: "Ultimate Collector Series",
            pieces: 7541,
            tags: &["UCS", "Millennium Falcon"],
            instructions: &["Book 1", "Book 2", "Book 3", "Book 4"],
            reviews: &[("kessel", "Huge", 5), ("runner", "Too big for my shelf", 3)],
        },
        CatalogSet {
            set_id: 30_351,
            number: "75301",
            variant: 1,
            name: "Luke Skywalker's X-wing Fighter",
            year: 2021,
            theme: "Star Wars",
            subtheme: "Episode IV",
            pieces: 474,
            tags: &["X-wing"],
            instructions: &["Book 1"],
            reviews: &[],
        },
    ]
}

const MINIFIGS: &[(&str, &str, &str)] = &[
    ("sw0001", "Battle Droid", "Star Wars"),
    ("sw0778", "Luke Skywalker", "Star Wars"),
    ("twn375", "Shopkeeper", "Town"),
];

#[derive(Clone, Debug, Default)]
struct SetEntry {
    own: bool,
    want: bool,
    qty_owned: i64,
    notes: String,
    rating: Option<i64>,
}

impl SetEntry {
    fn to_json(&self) -> Value {
        let mut value = json!({
            "owned": self.own,
            "wanted": self.want,
            "qtyOwned": self.qty_owned,
            "notes": self.notes,
        });
        if let Some(rating) = self.rating {
            value["rating"] = json!(rating);
        }
        value
    }
}

#[derive(Clone, Debug, Default)]
struct MinifigEntry {
    own: bool,
    want: bool,
    qty_owned: i64,
    notes: String,
}

#[derive(Debug)]
pub struct Store {
    api_key: String,
    users: HashMap<String, (String, String)>,
    sets: Vec<CatalogSet>,
    set_collection: HashMap<(String, u32), SetEntry>,
    minifig_collection: BTreeMap<(String, String), MinifigEntry>,
    get_sets_calls: u32,
}

impl Store {
    fn new(api_key: &str) -> Self {
        let mut users = HashMap::new();
        users.insert(
            DEMO_USERNAME.to_string(),
            (DEMO_PASSWORD.to_string(), DEMO_USER_HASH.to_string()),
        );
        Self {
            api_key: api_key.to_string(),
            users,
            sets: catalog(),
            set_collection: HashMap::new(),
            minifig_collection: BTreeMap::new(),
            get_sets_calls: 0,
        }
    }

    fn user_for_hash(&self, hash: &str) -> Option<String> {
        self.users
            .iter()
            .find(|(_, (_, h))| h == hash)
            .map(|(name, _)| name.clone())
    }

    fn set_by_id(&self, set_id: u32) -> Option<&CatalogSet> {
        self.sets.iter().find(|s| s.set_id == set_id)
    }
}

pub type Db = Arc<RwLock<Store>>;

type Fields = HashMap<String, String>;
type Envelope = Result<Value, String>;

pub fn app() -> Router {
    app_with_key(DEMO_API_KEY)
}

pub fn app_with_key(api_key: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::new(api_key)));
    Router::new()
        .route(&format!("{API_ROOT}/{{route}}"), post(dispatch))
        .with_state(db)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_key(api_key)).await
}

async fn dispatch(
    State(db): State<Db>,
    Path(route): Path<String>,
    Form(fields): Form<Fields>,
) -> Result<Json<Value>, StatusCode> {
    if !ROUTES.contains(&route.as_str()) {
        return Err(StatusCode::NOT_FOUND);
    }
    debug!(route = %route, "mock Brickset request");

    let mut store = db.write().await;
    let result = if fields.get("apiKey") != Some(&store.api_key) {
        Err("Invalid apiKey".to_string())
    } else {
        handle(&mut store, &route, &fields)
    };

    Ok(Json(match result {
        Ok(Value::Object(mut payload)) => {
            payload.insert("status".to_string(), json!("success"));
            Value::Object(payload)
        }
        Ok(_) => json!({ "status": "success" }),
        Err(message) => json!({ "status": "error", "message": message }),
    }))
}

fn handle(store: &mut Store, route: &str, fields: &Fields) -> Envelope {
    match route {
        "checkKey" => Ok(json!({})),
        "checkUserHash" => require_user(store, fields).map(|_| json!({})),
        "getKeyUsageStats" => Ok(json!({
            "matches": 1,
            "apiKeyUsage": [{ "dateStamp": "2024-01-15T00:00:00Z", "count": store.get_sets_calls }],
        })),
        "login" => login(store, fields),
        "getSets" => get_sets(store, fields),
        "getAdditionalImages" => {
            let set = lookup_set(store, fields)?;
            let number = set.full_number();
            let images: Vec<Value> = (1..=2)
                .map(|i| {
                    json!({
                        "thumbnailURL": format!("https://images.brickset.com/sets/AdditionalImages/{number}/tn_{i}.jpg"),
                        "imageURL": format!("https://images.brickset.com/sets/AdditionalImages/{number}/{i}.jpg"),
                    })
                })
                .collect();
            Ok(matches("additionalImages", images))
        }
        "getInstructions" => {
            let set = lookup_set(store, fields)?;
            Ok(matches("instructions", instructions(set)))
        }
        "getInstructions2" => {
            let number = fields.get("setNumber").cloned().unwrap_or_default();
            let list = store
                .sets
                .iter()
                .find(|s| s.full_number() == number)
                .map(instructions)
                .unwrap_or_default();
            Ok(matches("instructions", list))
        }
        "getReviews" => {
            let set = lookup_set(store, fields)?;
            let reviews = set
                .reviews
                .iter()
                .map(|(author, title, overall)| {
                    json!({
                        "author": author,
                        "datePosted": "2023-06-01T00:00:00Z",
                        "rating": {
                            "overall": overall,
                            "parts": overall,
                            "buildingExperience": overall,
                            "playability": 3,
                            "valueForMoney": 3,
                        },
                        "title": title,
                        "review": format!("{title}."),
                        "HTML": false,
                    })
                })
                .collect();
            Ok(matches("reviews", reviews))
        }
        "getThemes" => Ok(matches("themes", themes(store))),
        "getSubthemes" => {
            let theme = fields.get("Theme").cloned().unwrap_or_default();
            Ok(matches("subthemes", subthemes(store, &theme)))
        }
        "getYears" => {
            let theme = fields.get("Theme").cloned().unwrap_or_default();
            Ok(matches("years", years(store, &theme)))
        }
        "setCollection" => set_collection(store, fields),
        "getMinifigCollection" => get_minifig_collection(store, fields),
        "setMinifigCollection" => set_minifig_collection(store, fields),
        "getUserNotes" => {
            let user = require_user(store, fields)?;
            let notes: Vec<Value> = store
                .set_collection
                .iter()
                .filter(|((u, _), entry)| *u == user && !entry.notes.is_empty())
                .map(|((_, set_id), entry)| json!({ "setID": set_id, "notes": entry.notes }))
                .collect();
            Ok(matches("userNotes", notes))
        }
        "getUserMinifigNotes" => {
            let user = require_user(store, fields)?;
            let notes: Vec<Value> = store
                .minifig_collection
                .iter()
                .filter(|((u, _), entry)| *u == user && !entry.notes.is_empty())
                .map(|((_, number), entry)| {
                    json!({ "minifigNumber": number, "notes": entry.notes })
                })
                .collect();
            Ok(matches("userMinifigNotes", notes))
        }
        _ => Err(format!("Unknown method {route}")),
    }
}

fn matches(field: &str, items: Vec<Value>) -> Value {
    let mut payload = Map::new();
    payload.insert("matches".to_string(), json!(items.len()));
    payload.insert(field.to_string(), Value::Array(items));
    Value::Object(payload)
}

fn login(store: &Store, fields: &Fields) -> Envelope {
    let username = fields.get("username").map(String::as_str).unwrap_or_default();
    let password = fields.get("password").map(String::as_str).unwrap_or_default();
    match store.users.get(username) {
        Some((expected, hash)) if expected == password => Ok(json!({ "hash": hash })),
        _ => Err("Invalid username and/or password".to_string()),
    }
}

fn require_user(store: &Store, fields: &Fields) -> Result<String, String> {
    let hash = fields.get("userHash").map(String::as_str).unwrap_or_default();
    store
        .user_for_hash(hash)
        .ok_or_else(|| "Invalid userHash".to_string())
}

fn lookup_set<'a>(store: &'a Store, fields: &Fields) -> Result<&'a CatalogSet, String> {
    let set_id = fields
        .get("setID")
        .and_then(|id| id.parse::<u32>().ok())
        .ok_or_else(|| "Invalid setID".to_string())?;
    store
        .set_by_id(set_id)
        .ok_or_else(|| format!("No set found with setID {set_id}"))
}

fn instructions(set: &CatalogSet) -> Vec<Value> {
    let number = set.full_number();
    set.instructions
        .iter()
        .enumerate()
        .map(|(i, description)| {
            json!({
                "URL": format!("https://www.lego.com/cdn/product-assets/{number}/{i}.pdf"),
                "description": description,
            })
        })
        .collect()
}

fn params(fields: &Fields) -> Result<Map<String, Value>, String> {
    match fields.get("params") {
        None => Ok(Map::new()),
        Some(raw) => match serde_json::from_str(raw) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err("Invalid params".to_string()),
        },
    }
}

/// Comma-delimited or scalar filter values.
fn csv(value: Option<&Value>) -> Option<Vec<String>> {
    match value? {
        Value::String(s) => Some(s.split(',').map(|v| v.trim().to_string()).collect()),
        other => Some(vec![other.to_string()]),
    }
}

fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s == "1",
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

fn int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn get_sets(store: &mut Store, fields: &Fields) -> Envelope {
    store.get_sets_calls += 1;
    let params = params(fields)?;
    let hash = fields.get("userHash").map(String::as_str).unwrap_or_default();
    let user = if hash.is_empty() {
        None
    } else {
        Some(store.user_for_hash(hash).ok_or("Invalid userHash")?)
    };

    let owned = flag(params.get("owned"));
    let wanted = flag(params.get("wanted"));
    if (owned || wanted) && user.is_none() {
        return Err("owned and wanted require a userHash".to_string());
    }

    let set_id = int(params.get("setID"));
    let query = params
        .get("query")
        .and_then(Value::as_str)
        .map(str::to_lowercase);
    let themes = csv(params.get("theme"));
    let subthemes = csv(params.get("subtheme"));
    let numbers = csv(params.get("setNumber"));
    let years = csv(params.get("year"));
    let extended = flag(params.get("extendedData"));
    let page_size = int(params.get("pageSize"))
        .and_then(|n| usize::try_from(n).ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    let page_number = int(params.get("pageNumber"))
        .and_then(|n| usize::try_from(n).ok())
        .filter(|&n| n > 0)
        .unwrap_or(1);

    let entry_for = |set: &CatalogSet| {
        user.as_ref()
            .and_then(|u| store.set_collection.get(&(u.clone(), set.set_id)))
    };

    let found: Vec<Value> = store
        .sets
        .iter()
        .filter(|s| set_id.is_none_or(|id| i64::from(s.set_id) == id))
        .filter(|s| {
            query.as_ref().is_none_or(|q| {
                [s.full_number(), s.name.to_string(), s.theme.to_string(), s.subtheme.to_string()]
                    .iter()
                    .any(|field| field.to_lowercase().contains(q))
            })
        })
        .filter(|s| themes.as_ref().is_none_or(|t| t.iter().any(|t| t == s.theme)))
        .filter(|s| subthemes.as_ref().is_none_or(|t| t.iter().any(|t| t == s.subtheme)))
        .filter(|s| numbers.as_ref().is_none_or(|n| n.contains(&s.full_number())))
        .filter(|s| years.as_ref().is_none_or(|y| y.contains(&s.year.to_string())))
        .filter(|s| !owned || entry_for(*s).is_some_and(|e| e.own))
        .filter(|s| !wanted || entry_for(*s).is_some_and(|e| e.want))
        .map(|s| s.to_json(entry_for(s), extended))
        .collect();

    let total = found.len();
    let page: Vec<Value> = found
        .into_iter()
        .skip(page_number.saturating_sub(1).saturating_mul(page_size))
        .take(page_size)
        .collect();
    Ok(json!({ "matches": total, "sets": page }))
}

fn themes(store: &Store) -> Vec<Value> {
    let mut grouped: BTreeMap<&str, Vec<&CatalogSet>> = BTreeMap::new();
    for set in &store.sets {
        grouped.entry(set.theme).or_default().push(set);
    }
    grouped
        .into_iter()
        .map(|(theme, sets)| {
            let mut subthemes: Vec<&str> = sets.iter().map(|s| s.subtheme).collect();
            subthemes.sort_unstable();
            subthemes.dedup();
            json!({
                "theme": theme,
                "setCount": sets.len(),
                "subthemeCount": subthemes.len(),
                "yearFrom": sets.iter().map(|s| s.year).min(),
                "yearTo": sets.iter().map(|s| s.year).max(),
            })
        })
        .collect()
}

fn subthemes(store: &Store, theme: &str) -> Vec<Value> {
    let mut grouped: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for set in store.sets.iter().filter(|s| s.theme == theme) {
        grouped.entry(set.subtheme).or_default().push(set.year);
    }
    grouped
        .into_iter()
        .map(|(subtheme, years)| {
            json!({
                "theme": theme,
                "subtheme": subtheme,
                "setCount": years.len(),
                "yearFrom": years.iter().min(),
                "yearTo": years.iter().max(),
            })
        })
        .collect()
}

fn years(store: &Store, theme: &str) -> Vec<Value> {
    let mut grouped: BTreeMap<u32, usize> = BTreeMap::new();
    for set in store
        .sets
        .iter()
        .filter(|s| theme.is_empty() || s.theme == theme)
    {
        *grouped.entry(set.year).or_default() += 1;
    }
    grouped
        .into_iter()
        .map(|(year, count)| json!({ "theme": theme, "year": year.to_string(), "setCount": count }))
        .collect()
}

fn set_collection(store: &mut Store, fields: &Fields) -> Envelope {
    let user = require_user(store, fields)?;
    let set_id = lookup_set(store, fields)?.set_id;
    let params = params(fields)?;

    let entry = store.set_collection.entry((user, set_id)).or_default();
    if let Some(want) = params.get("want") {
        entry.want = flag(Some(want));
    }
    if let Some(notes) = params.get("notes").and_then(Value::as_str) {
        entry.notes = notes.to_string();
    }
    if let Some(rating) = int(params.get("rating")) {
        entry.rating = Some(rating);
    }
    if let Some(qty) = int(params.get("qtyOwned")) {
        entry.qty_owned = qty;
    }
    if let Some(own) = params.get("own") {
        entry.own = flag(Some(own));
    }
    if !entry.own {
        entry.qty_owned = 0;
    } else if entry.qty_owned == 0 {
        entry.qty_owned = 1;
    }
    Ok(json!({}))
}

fn get_minifig_collection(store: &Store, fields: &Fields) -> Envelope {
    let user = require_user(store, fields)?;
    let params = params(fields)?;
    let owned = flag(params.get("owned"));
    let wanted = flag(params.get("wanted"));
    let query = params
        .get("query")
        .and_then(Value::as_str)
        .map(str::to_lowercase);

    let minifigs: Vec<Value> = store
        .minifig_collection
        .iter()
        .filter(|((u, _), _)| *u == user)
        .filter_map(|((_, number), entry)| {
            let (_, name, category) = MINIFIGS.iter().find(|(n, _, _)| n == number)?;
            Some((number, *name, *category, entry))
        })
        .filter(|(_, _, _, entry)| {
            if owned || wanted {
                (owned && entry.own) || (wanted && entry.want)
            } else {
                entry.own
            }
        })
        .filter(|(number, name, _, _)| {
            query.as_ref().is_none_or(|q| {
                number.to_lowercase().contains(q) || name.to_lowercase().contains(q)
            })
        })
        .map(|(number, name, category, entry)| {
            json!({
                "minifigNumber": number,
                "name": name,
                "category": category,
                "ownedInSets": 0,
                "ownedLoose": entry.qty_owned,
                "ownedTotal": entry.qty_owned,
                "wanted": entry.want,
            })
        })
        .collect();
    Ok(matches("minifigs", minifigs))
}

fn set_minifig_collection(store: &mut Store, fields: &Fields) -> Envelope {
    let user = require_user(store, fields)?;
    let number = fields.get("minifigNumber").cloned().unwrap_or_default();
    if !MINIFIGS.iter().any(|(n, _, _)| *n == number) {
        return Err(format!("No minifig found with number {number}"));
    }
    let params = params(fields)?;

    let entry = store.minifig_collection.entry((user, number)).or_default();
    entry.want = flag(params.get("want"));
    entry.qty_owned = int(params.get("qtyOwned")).unwrap_or_default();
    entry.own = flag(params.get("own")) || entry.qty_owned > 0;
    if !entry.own {
        entry.qty_owned = 0;
    }
    if let Some(notes) = params.get("notes").and_then(Value::as_str) {
        entry.notes = notes.to_string();
    }
    Ok(json!({}))
}
