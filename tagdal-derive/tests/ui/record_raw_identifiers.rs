use tagdal::{Record, Registry};

#[derive(Record)]
#[sql(table = "events")]
pub struct Event {
    pub id: i64,
    pub r#type: String,
    #[sql(column = "created")]
    pub created_at: chrono::NaiveDateTime,
    #[sql(skip)]
    pub local: Option<String>,
}

fn main() {
    assert_eq!(Event::table_name(), "events");
    let registry = Registry::new();
    let columns = registry.columns_of::<[Event]>().unwrap();
    assert_eq!(&*columns, &["id", "type", "created"]);
}
