pub mod case_search_service;
pub use case_search_service::{
    CaseDetail, CaseSearchService, ResultSource, SearchError, SearchResponse,
};

pub mod case_search_service_impl;
pub use case_search_service_impl::SeaOrmCaseSearchService;
