use crate::feed::model::StreamQuery;
use crate::workflow::runner::Runner;
use futures_util::stream;
use log::{info, warn};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use warp::http::{header, StatusCode};
use warp::hyper::Body;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

/// `GET /stream` streams one NDJSON session; `GET /catalog` returns the object catalog.
pub fn routes(
    runner: Runner,
    tick: Duration,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let runner_filter = warp::any().map(move || runner.clone());

    let stream_route = warp::path("stream")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<StreamQuery>())
        .and(runner_filter.clone())
        .map(move |query: StreamQuery, runner: Runner| stream_session(query, runner, tick));

    let catalog_route = warp::path("catalog")
        .and(warp::path::end())
        .and(warp::get())
        .and(runner_filter)
        .map(|runner: Runner| warp::reply::json(&runner.catalog()).into_response());

    stream_route.or(catalog_route).unify()
}

fn stream_session(query: StreamQuery, runner: Runner, tick: Duration) -> Response {
    let params = match query.to_params() {
        Ok(params) => params,
        Err(err) => {
            warn!("rejecting stream request {:?}: {}", query, err);
            return warp::reply::with_status(
                warp::reply::json(&json!({ "error": err.to_string() })),
                StatusCode::BAD_REQUEST,
            )
            .into_response();
        }
    };

    info!(
        "streaming {} steps of {} objects ({:?})",
        params.step_count(),
        runner.object_count(),
        params
    );

    let lines = stream::unfold((runner.run(params), true), move |(mut run, first)| async move {
        if !first && !tick.is_zero() {
            tokio::time::sleep(tick).await;
        }
        run.next()
            .map(|line| (Ok::<_, Infallible>(line), (run, false)))
    });

    let mut response = Response::new(Body::wrap_stream(lines));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/x-ndjson"),
    );
    response
}

pub async fn serve(runner: Runner, tick: Duration, addr: SocketAddr) {
    info!("feed listening on http://{}", addr);
    warp::serve(routes(runner, tick)).run(addr).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::FeedConfig;
    use orbitcore::catalog::ObjectCatalog;
    use orbitcore::stream::{FrameLineDecoder, MessageClassifier, StreamMessage};

    fn runner() -> Runner {
        Runner::new(&FeedConfig::from_args(25, 11, 0))
    }

    #[tokio::test]
    async fn catalog_route_lists_population() {
        let response = warp::test::request()
            .method("GET")
            .path("/catalog")
            .reply(&routes(runner(), Duration::ZERO))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = std::str::from_utf8(response.body()).unwrap();
        let catalog = ObjectCatalog::from_json_str(body).unwrap();
        assert_eq!(catalog.len(), 25);
    }

    #[tokio::test]
    async fn stream_route_emits_ndjson_session() {
        let response = warp::test::request()
            .method("GET")
            .path("/stream?collision_threshold=1&length=4&step=2")
            .reply(&routes(runner(), Duration::ZERO))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/x-ndjson"
        );

        let mut decoder = FrameLineDecoder::new();
        let classifier = MessageClassifier::new();
        let frames = decoder
            .push(response.body())
            .filter_map(|line| classifier.accept(&line))
            .filter(|message| matches!(message, StreamMessage::Frame(_)))
            .count();
        assert_eq!(frames, 2);
    }

    #[tokio::test]
    async fn invalid_parameters_are_rejected() {
        let response = warp::test::request()
            .method("GET")
            .path("/stream?collision_threshold=1&length=4&step=9")
            .reply(&routes(runner(), Duration::ZERO))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
