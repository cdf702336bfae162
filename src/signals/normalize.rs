//! Conversion of raw signal documents into [`Signal`] values.
//!
//! The signals API serializes database documents in MongoDB extended JSON,
//! so numbers, dates and identifiers may arrive wrapped in marker objects
//! (`{"$numberLong": "42"}`, `{"$date": "..."}`, `{"$oid": "..."}`).
//! Normalization never fails: anything missing or malformed falls back to an
//! empty value.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};

use crate::models::{Signal, SignalData, Subscriber};

/// Recursively replace extended-JSON wrappers with their plain JSON values.
pub fn unwrap_extended_json(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(unwrap_extended_json).collect()),
        Value::Object(map) => match unwrap_wrapper(&map) {
            Some(plain) => plain,
            None => Value::Object(
                map.into_iter()
                    .map(|(key, inner)| (key, unwrap_extended_json(inner)))
                    .collect(),
            ),
        },
        other => other,
    }
}

fn unwrap_wrapper(map: &Map<String, Value>) -> Option<Value> {
    if let Some(raw) = map.get("$numberLong").or_else(|| map.get("$numberInt")) {
        return Some(unwrap_integer(raw));
    }

    if let Some(raw) = map.get("$numberDouble") {
        let parsed = raw
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .and_then(Number::from_f64)
            .map(Value::Number);
        return Some(parsed.unwrap_or_else(|| raw.clone()));
    }

    // Kept as text so no precision is lost; decimal fields parse strings.
    if let Some(raw) = map.get("$numberDecimal") {
        return Some(raw.clone());
    }

    if let Some(raw) = map.get("$date") {
        return Some(unwrap_date(raw));
    }

    if let Some(raw) = map.get("$oid") {
        return Some(raw.clone());
    }

    None
}

fn unwrap_integer(raw: &Value) -> Value {
    match raw {
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| raw.clone()),
        other => other.clone(),
    }
}

/// `$date` holds either an ISO-8601 string or a `$numberLong` of epoch millis.
fn unwrap_date(raw: &Value) -> Value {
    let millis = match unwrap_extended_json(raw.clone()) {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => return Value::String(s),
        other => return other,
    };

    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| Value::String(dt.to_rfc3339()))
        .unwrap_or_else(|| raw.clone())
}

/// Build a [`Signal`] from one raw API record.
pub fn normalize_signal(raw: Value) -> Signal {
    let unwrapped = unwrap_extended_json(raw);
    let Some(doc) = unwrapped.as_object() else {
        return Signal::default();
    };

    Signal {
        id: text(doc.get("_id")).unwrap_or_default(),
        tweet_id: text(doc.get("tweet_id")),
        twitter_handle: text(doc.get("twitterHandle")),
        coin: text(doc.get("coin")),
        signal_message: text(doc.get("signal_message")),
        signal_data: doc
            .get("signal_data")
            .and_then(Value::as_object)
            .map(normalize_signal_data)
            .unwrap_or_default(),
        generated_at: timestamp(doc.get("generatedAt")),
        subscribers: doc
            .get("subscribers")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(normalize_subscriber).collect())
            .unwrap_or_default(),
        tweet_link: text(doc.get("tweet_link")),
        message_sent: truthy(doc.get("messageSent")),
    }
}

fn normalize_signal_data(data: &Map<String, Value>) -> SignalData {
    SignalData {
        token: text(data.get("token")),
        signal: text(data.get("signal")),
        current_price: decimal(data.get("currentPrice")),
        price_at_tweet: decimal(data.get("priceAtTweet")),
        targets: data
            .get("targets")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|v| decimal(Some(v))).collect())
            .unwrap_or_default(),
        stop_loss: decimal(data.get("stopLoss")),
        timeline: text(data.get("timeline")),
        max_exit_time: text(data.get("maxExitTime")),
        trade_tip: text(data.get("tradeTip")),
        tweet_link: text(data.get("tweet_link")),
        token_mentioned: text(data.get("tokenMentioned")),
        token_id: text(data.get("tokenId")),
    }
}

fn normalize_subscriber(value: &Value) -> Option<Subscriber> {
    let entry = value.as_object()?;
    Some(Subscriber {
        username: text(entry.get("username")).unwrap_or_default(),
        sent: truthy(entry.get("sent")),
    })
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn decimal(value: Option<&Value>) -> Option<Decimal> {
    let raw = match value? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    raw.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}

fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

/// Loose truthiness: non-zero numbers, non-empty strings and any container count as true.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
