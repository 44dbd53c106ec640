use cloudmap_core::{CloudNode, Dataset, NodeType};

pub const SAMPLE_ROOT: &str = "cloud";

/// A small multi-cloud estate used when no dataset file is given.
pub fn sample_dataset() -> Dataset {
    Dataset::new(
        SAMPLE_ROOT,
        vec![
            CloudNode::new(SAMPLE_ROOT, "Cloud", NodeType::Cloud)
                .with_counts(12, 5)
                .with_children(["gcp", "aws", "azure", "saas"]),
            // GCP
            CloudNode::new("gcp", "GCP", NodeType::Gcp)
                .with_counts(142, 18)
                .with_children(["gcp-prod", "gcp-staging"]),
            CloudNode::new("gcp-prod", "Production Project", NodeType::Account)
                .with_counts(96, 9)
                .with_children(["gcp-gke", "gcp-storage", "gcp-sql"]),
            CloudNode::new("gcp-gke", "GKE Cluster", NodeType::Service).with_counts(64, 4),
            CloudNode::new("gcp-storage", "Cloud Storage", NodeType::Service).with_counts(21, 3),
            CloudNode::new("gcp-sql", "Cloud SQL", NodeType::Service).with_counts(11, 2),
            CloudNode::new("gcp-staging", "Staging Project", NodeType::Account)
                .with_counts(8, 6)
                .with_children(["gcp-run"]),
            CloudNode::new("gcp-run", "Cloud Run", NodeType::Service).with_counts(8, 6),
            // AWS
            CloudNode::new("aws", "AWS", NodeType::Aws)
                .with_counts(78, 27)
                .with_children(["aws-main", "aws-sandbox"]),
            CloudNode::new("aws-main", "Main Account", NodeType::Account)
                .with_counts(70, 20)
                .with_children(["aws-ec2", "aws-s3", "aws-iam"]),
            CloudNode::new("aws-ec2", "EC2", NodeType::Service).with_counts(33, 7),
            CloudNode::new("aws-s3", "S3", NodeType::Service).with_counts(25, 11),
            CloudNode::new("aws-iam", "IAM", NodeType::Service).with_counts(12, 2),
            CloudNode::new("aws-sandbox", "Sandbox Account", NodeType::Account)
                .with_counts(8, 7)
                .with_children(["aws-lambda"]),
            CloudNode::new("aws-lambda", "Lambda", NodeType::Service).with_counts(8, 7),
            // Azure
            CloudNode::new("azure", "Azure", NodeType::Azure)
                .with_counts(31, 4)
                .with_children(["azure-sub"]),
            CloudNode::new("azure-sub", "Subscription", NodeType::Account)
                .with_counts(31, 4)
                .with_children(["azure-aks"]),
            CloudNode::new("azure-aks", "AKS", NodeType::Service).with_counts(31, 4),
            // SaaS
            CloudNode::new("saas", "SaaS", NodeType::Saas)
                .with_counts(5, 9)
                .with_children(["github", "slack"]),
            CloudNode::new("github", "GitHub", NodeType::Service).with_counts(4, 6),
            CloudNode::new("slack", "Slack", NodeType::Service).with_counts(1, 3),
        ],
    )
}
