use indoc::indoc;
use saphyr_cursor::{Deserializer, Error, ErrorKind, Event, Visit};
use test_log::test;

#[test]
fn empty_map_calls_no_visitor() -> anyhow::Result<()> {
    let mut de = Deserializer::from_str("{}")?;
    let mut calls = 0;
    let visited = de.deserialize_map(|_, _| {
        calls += 1;
        Ok(Visit::Consumed)
    })?;
    assert_eq!(visited, Some(0));
    assert_eq!(calls, 0);
    de.finish()?;
    Ok(())
}

#[test]
fn empty_list_calls_no_visitor() -> anyhow::Result<()> {
    let mut de = Deserializer::from_str("[]")?;
    let visited = de.deserialize_list(|_, _| panic!("no items expected"))?;
    assert_eq!(visited, Some(0));
    Ok(())
}

#[test]
fn visitor_failure_stops_the_traversal() -> anyhow::Result<()> {
    let mut de = Deserializer::from_str("{a: 1, b: 2, c: 3}")?;
    let mut seen = Vec::new();
    let err = de
        .deserialize_map(|de, key| {
            seen.push(key.to_string());
            if seen.len() == 2 {
                return Err(Error::custom("second key refused"));
            }
            de.deserialize_i32()?;
            Ok(Visit::Consumed)
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CallbackSignaledError);
    assert_eq!(seen, vec!["a", "b"]);
    assert_eq!(de.error_kind(), ErrorKind::CallbackSignaledError);
    assert!(err.to_string().contains("key `b`: second key refused"), "{err}");
    Ok(())
}

#[test]
fn scalar_where_mapping_expected_is_unexpected_event() -> anyhow::Result<()> {
    let mut de = Deserializer::from_str("just a scalar")?;
    let err = de.deserialize_map(|_, _| Ok(Visit::Skip)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEvent);
    assert_eq!(de.strerror(), "unexpected event");
    drop(de);

    let mut de = Deserializer::from_str("{a: 1}")?;
    let err = de.deserialize_list(|_, _| Ok(Visit::Skip)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEvent);
    Ok(())
}

#[test]
fn non_scalar_key_is_unexpected_event() -> anyhow::Result<()> {
    let mut de = Deserializer::from_str("? [a, b]\n: value\n")?;
    let err = de.deserialize_map(|_, _| Ok(Visit::Skip)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEvent);
    Ok(())
}

#[test]
fn each_value_is_consumed_exactly_once() -> anyhow::Result<()> {
    let yaml = indoc! {"
        a:
          x: 1
          y: [true, false]
        b: [1, [2, 3]]
        c: 3
    "};
    let mut de = Deserializer::from_str(yaml)?;
    let mut after = Vec::new();
    de.deserialize_map(|de, key| {
        match key {
            "a" => {
                de.deserialize_map(|de, _| {
                    de.skip_value()?;
                    Ok(Visit::Consumed)
                })?;
            }
            "b" => {
                de.deserialize_list(|de, index| {
                    if index == 0 {
                        de.deserialize_i32()?;
                    } else {
                        de.skip_value()?;
                    }
                    Ok(Visit::Consumed)
                })?;
            }
            _ => {
                de.deserialize_i32()?;
            }
        }
        let next = match de.current_event() {
            Event::Scalar { value, .. } => format!("key {value}"),
            other => other.describe().to_string(),
        };
        after.push(next);
        Ok(Visit::Consumed)
    })?;
    assert_eq!(after, vec!["key b", "key c", "mapping end"]);
    assert!(de.is_exhausted());
    de.finish()?;
    Ok(())
}

#[test]
fn visitor_consuming_nothing_is_reported() -> anyhow::Result<()> {
    let mut de = Deserializer::from_str("[1, 2]")?;
    let err = de.deserialize_list(|_, _| Ok(Visit::Consumed)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEvent);
    Ok(())
}

#[test]
fn peek_does_not_lose_events() -> anyhow::Result<()> {
    let mut de = Deserializer::from_str("[10, 20, 30]")?;
    let mut items = Vec::new();
    de.deserialize_list(|de, _| {
        let first = de.peek_event()?.clone();
        let second = de.peek_event()?.clone();
        assert_eq!(first, second);
        items.push(de.deserialize_i32()?.unwrap_or_default());
        Ok(Visit::Consumed)
    })?;
    assert_eq!(items, vec![10, 20, 30]);
    Ok(())
}

#[test]
fn decoding_past_the_end_yields_none() -> anyhow::Result<()> {
    let mut de = Deserializer::from_str("")?;
    assert!(de.is_exhausted());
    assert_eq!(de.deserialize_map(|_, _| Ok(Visit::Skip))?, None);
    assert_eq!(de.deserialize_list(|_, _| Ok(Visit::Skip))?, None);
    assert_eq!(de.deserialize_string()?, None);
    assert_eq!(de.skip_value()?, None);
    assert_eq!(de.error_kind(), ErrorKind::NoError);
    assert_eq!(de.strerror(), "no error");
    Ok(())
}

#[test]
fn nested_failure_keeps_original_cause() -> anyhow::Result<()> {
    let yaml = indoc! {"
        outer:
          flags: [true, maybe]
    "};
    let mut de = Deserializer::from_str(yaml)?;
    let err = de
        .deserialize_map(|de, _| {
            de.deserialize_map(|de, _| {
                de.deserialize_list(|de, _| {
                    de.deserialize_bool()?;
                    Ok(Visit::Consumed)
                })?;
                Ok(Visit::Consumed)
            })?;
            Ok(Visit::Consumed)
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CallbackSignaledError);
    let cause = err.cause().expect("visitor error is kept as cause");
    assert_eq!(cause.kind(), ErrorKind::InvalidBooleanToken);
    let location = err.location().expect("location is known");
    assert_eq!(location.line(), 2);
    Ok(())
}
