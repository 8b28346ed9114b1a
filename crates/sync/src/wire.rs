//! GraphQL response shapes of the points feed.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::feed::{FeedEvent, FeedPage, PointsInfo};
use crate::types::{FeedError, FeedResult};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

fn parse_envelope<T: DeserializeOwned>(body: &str) -> FeedResult<T> {
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|err| FeedError::Parse(err.to_string()))?;
    match envelope.data {
        Some(data) => Ok(data),
        None if envelope.errors.is_empty() => {
            Err(FeedError::Parse("response has no data".to_string()))
        }
        None => {
            let messages: Vec<String> = envelope
                .errors
                .into_iter()
                .map(|error| error.message)
                .collect();
            Err(FeedError::Parse(messages.join("; ")))
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryData {
    viewer: HistoryViewer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryViewer {
    points_history_connection: HistoryConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryConnection {
    edges: Vec<HistoryEdge>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct HistoryEdge {
    node: HistoryNode,
    cursor: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryNode {
    id: String,
    point_cost: i64,
    creation_time: i64,
    bot: BotRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BotRef {
    display_name: String,
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

pub(crate) fn parse_history_page(body: &str) -> FeedResult<FeedPage> {
    let data: HistoryData = parse_envelope(body)?;
    let connection = data.viewer.points_history_connection;
    let next_cursor = connection
        .page_info
        .end_cursor
        .filter(|cursor| !cursor.is_empty());
    if connection.page_info.has_next_page && next_cursor.is_none() {
        return Err(FeedError::Parse(
            "next page advertised without an end cursor".to_string(),
        ));
    }
    let events = connection
        .edges
        .into_iter()
        .map(|edge| FeedEvent {
            id: edge.node.id,
            point_cost: edge.node.point_cost,
            creation_time: edge.node.creation_time,
            bot_name: edge.node.bot.display_name,
            bot_id: edge.node.bot.id,
            cursor: edge.cursor,
        })
        .collect();
    Ok(FeedPage {
        events,
        next_cursor,
        has_more: connection.page_info.has_next_page,
    })
}

#[derive(Debug, Deserialize)]
struct SettingsData {
    viewer: SettingsViewer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsViewer {
    message_point_info: MessagePointInfo,
    subscription: Option<Subscription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePointInfo {
    total_message_point_allotment: i64,
    subscription_point_balance: i64,
    compute_point_next_grant_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Subscription {
    expires_time: Option<i64>,
    subscription_product: Option<Product>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Product {
    display_name: String,
}

pub(crate) fn parse_points_info(body: &str) -> FeedResult<PointsInfo> {
    let data: SettingsData = parse_envelope(body)?;
    let info = data.viewer.message_point_info;
    let subscription = data.viewer.subscription;
    Ok(PointsInfo {
        total_allotment: info.total_message_point_allotment,
        balance: info.subscription_point_balance,
        next_grant_time: info.compute_point_next_grant_time,
        expires_time: subscription.as_ref().and_then(|sub| sub.expires_time),
        product_name: subscription
            .and_then(|sub| sub.subscription_product)
            .map(|product| product.display_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
      "data": {"viewer": {"pointsHistoryConnection": {
        "edges": [
          {"node": {"id": "UG9pbnQ6MQ==", "pointCost": 340, "creationTime": 1750000000000000,
                    "bot": {"displayName": "Claude-Sonnet", "id": "Qm90OjE="}},
           "cursor": "c1"},
          {"node": {"id": "UG9pbnQ6Mg==", "pointCost": 0, "creationTime": 1749999000000000,
                    "bot": {"displayName": "GPT-4o", "id": "Qm90OjI="}},
           "cursor": "c2"}
        ],
        "pageInfo": {"endCursor": "c2", "hasNextPage": true}
      }}}
    }"#;

    #[test]
    fn parses_history_page() {
        let page = parse_history_page(PAGE).expect("page");
        assert_eq!(page.events.len(), 2);
        assert_eq!(page.events[0].id, "UG9pbnQ6MQ==");
        assert_eq!(page.events[0].point_cost, 340);
        assert_eq!(page.events[0].bot_name, "Claude-Sonnet");
        assert_eq!(page.events[1].cursor, "c2");
        assert_eq!(page.next_cursor.as_deref(), Some("c2"));
        assert!(page.has_more);
    }

    #[test]
    fn last_page_may_omit_end_cursor() {
        let body = r#"{"data": {"viewer": {"pointsHistoryConnection": {
            "edges": [], "pageInfo": {"endCursor": null, "hasNextPage": false}}}}}"#;
        let page = parse_history_page(body).expect("page");
        assert!(page.events.is_empty());
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn has_next_without_cursor_is_a_parse_failure() {
        let body = r#"{"data": {"viewer": {"pointsHistoryConnection": {
            "edges": [], "pageInfo": {"endCursor": "", "hasNextPage": true}}}}}"#;
        let err = parse_history_page(body).expect_err("should fail");
        assert!(err.is_parse());
    }

    #[test]
    fn missing_required_field_is_a_parse_failure() {
        let body = r#"{"data": {"viewer": {"pointsHistoryConnection": {
            "edges": [{"node": {"id": "x", "creationTime": 1, "bot": {"displayName": "a", "id": "b"}},
                       "cursor": "c"}],
            "pageInfo": {"endCursor": "c", "hasNextPage": false}}}}}"#;
        let err = parse_history_page(body).expect_err("should fail");
        assert!(matches!(err, FeedError::Parse(message) if message.contains("pointCost")));
    }

    #[test]
    fn graphql_errors_surface_as_parse_failure() {
        let body = r#"{"data": null, "errors": [{"message": "not logged in"}]}"#;
        let err = parse_history_page(body).expect_err("should fail");
        assert!(matches!(err, FeedError::Parse(message) if message == "not logged in"));
    }

    #[test]
    fn parses_points_info() {
        let body = r#"{"data": {"viewer": {
            "messagePointInfo": {"totalMessagePointAllotment": 1000000,
                                 "subscriptionPointBalance": 250000,
                                 "computePointNextGrantTime": 1752000000000000},
            "subscription": {"expiresTime": 1760000000000000,
                             "subscriptionProduct": {"displayName": "Monthly"}}}}}"#;
        let info = parse_points_info(body).expect("info");
        assert_eq!(info.total_allotment, 1_000_000);
        assert_eq!(info.balance, 250_000);
        assert_eq!(info.next_grant_time, Some(1_752_000_000_000_000));
        assert_eq!(info.expires_time, Some(1_760_000_000_000_000));
        assert_eq!(info.product_name.as_deref(), Some("Monthly"));
    }
}
