use async_graphql::http::GraphiQLSource;
use async_graphql::{Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Schema};
use async_graphql_axum::GraphQL;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::analyze::{Analysis, AnalysisPipeline};

/// Message returned to callers for every analysis failure; detail stays server-side
const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze video";

pub type AnalysisSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Extract and transcribe the audio track of a video, with a sentiment verdict
    async fn analyze_video(
        &self,
        ctx: &Context<'_>,
        url: String,
    ) -> async_graphql::Result<Analysis> {
        let pipeline = ctx.data::<Arc<AnalysisPipeline>>()?;

        match pipeline.analyze(&url).await {
            Ok(analysis) => Ok(analysis),
            Err(err) => {
                tracing::error!("Error analyzing video {}: {}", url, err);
                Err(
                    async_graphql::Error::new(ANALYSIS_FAILED_MESSAGE)
                        .extend_with(|_, ext| ext.set("code", err.code())),
                )
            }
        }
    }
}

/// Build the schema with the pipeline available to resolvers
pub fn build_schema(pipeline: Arc<AnalysisPipeline>) -> AnalysisSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(pipeline)
        .finish()
}

/// Assemble the HTTP surface: GraphQL on /graphql, GraphiQL on /
pub fn router(schema: AnalysisSchema) -> Router {
    Router::new()
        .route("/", get(graphiql))
        .route_service("/graphql", GraphQL::new(schema))
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
