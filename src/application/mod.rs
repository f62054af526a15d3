use crate::domain::include_scan::{ScanReport, TransitiveScanner};
use crate::domain::path::PathNormalizer;
use crate::domain::scope_tree::ScopeTree;
use crate::domain::trace::{TraceError, TraceParser};
use crate::ports::{GraphExporter, SourceResolver};
use std::io::{self, Write};

/// Knobs for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub max_depth: usize,
    pub root_name: String,
    /// Run the transitive include scan after parsing.
    pub scan: bool,
}

/// Output of the parse and scan stages.
#[derive(Debug)]
pub struct Analysis {
    pub tree: ScopeTree,
    pub scan: Option<ScanReport>,
}

/// Parse → scan → render pipeline. Each stage finishes before the next starts.
pub struct AnalyzeUsecase<'a> {
    pub normalizer: &'a PathNormalizer,
    pub resolver: &'a dyn SourceResolver,
    pub exporter: &'a dyn GraphExporter,
}

impl<'a> AnalyzeUsecase<'a> {
    pub fn analyze(&self, trace: &str, options: &AnalyzeOptions) -> Result<Analysis, TraceError> {
        let mut tree = ScopeTree::new();
        let mut parser = TraceParser::new(self.normalizer, options.max_depth, &options.root_name);
        parser.parse_section(trace, &mut tree)?;

        let scan = options
            .scan
            .then(|| TransitiveScanner::new(self.resolver).scan(&tree));

        Ok(Analysis { tree, scan })
    }

    pub fn render(&self, analysis: &Analysis, out: &mut dyn Write) -> io::Result<()> {
        self.exporter.export(&analysis.tree, out)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::path::NormalizerConfig;
    use crate::infrastructure::FsSourceResolver;
    use crate::ports::cluster_exporter::ClusterDotExporter;

    #[test]
    fn test_analyze_and_render_is_deterministic() {
        let normalizer = PathNormalizer::new(NormalizerConfig::default());
        let resolver = FsSourceResolver::new(vec![]);
        let usecase = AnalyzeUsecase {
            normalizer: &normalizer,
            resolver: &resolver,
            exporter: &ClusterDotExporter,
        };
        let options = AnalyzeOptions {
            max_depth: 10_000,
            root_name: "main.cc".to_string(),
            scan: false,
        };
        let trace = ". a/x.h\n.. b/y.h\n.. a/z.h\n. c.h\n";

        let render = || {
            let analysis = usecase.analyze(trace, &options).unwrap();
            let mut buf = Vec::new();
            usecase.render(&analysis, &mut buf).unwrap();
            buf
        };
        let first = render();
        assert_eq!(first, render());

        let analysis = usecase.analyze(trace, &options).unwrap();
        assert!(analysis.scan.is_none());
        assert_eq!(analysis.tree.edge_count(), 4);
    }

    #[test]
    fn test_scan_misses_do_not_abort() {
        let normalizer = PathNormalizer::new(NormalizerConfig::default());
        let resolver = FsSourceResolver::new(vec![]);
        let usecase = AnalyzeUsecase {
            normalizer: &normalizer,
            resolver: &resolver,
            exporter: &ClusterDotExporter,
        };
        let options = AnalyzeOptions {
            max_depth: 10_000,
            root_name: "main.cc".to_string(),
            scan: true,
        };

        let analysis = usecase
            .analyze(". no/such/dir/header.h\n", &options)
            .unwrap();
        let report = analysis.scan.as_ref().unwrap();
        assert!(report.skipped.contains(&"no/such/dir/header.h".to_string()));

        let mut buf = Vec::new();
        usecase.render(&analysis, &mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("\"main.cc\" -> \"no/such/dir/header.h\""));
    }
}
