//! CID 218: Quantitative Image Features.
//!
//! Intensity histogram, co-occurrence matrix and run length features.

use super::context_group;

context_group! {
    /// CID 218: Quantitative Image Features.
    pub type Cid218QuantitativeImageFeature = ContextGroup<QuantitativeImageFeature> {
        identifier: "218",
        version: "20200920",
        uid: "1.2.840.10008.6.1.1269",
        extensible: true,
        codes: {
            IntensityHistogramMean => ("X6K6", "IBSI", "Intensity Histogram Mean"),
            IntensityHistogramVariance => ("CH89", "IBSI", "Intensity Histogram Variance"),
            IntensityHistogramSkewness => ("88K1", "IBSI", "Intensity Histogram Skewness"),
            IntensityHistogramKurtosis => ("C3I7", "IBSI", "Intensity Histogram Kurtosis"),
            IntensityHistogramMedian => ("WIFQ", "IBSI", "Intensity Histogram Median"),
            IntensityHistogramMinimumGrayLevel => ("1PR8", "IBSI", "Intensity Histogram Minimum Gray Level"),
            IntensityHistogram10thPercentile => ("GPMT", "IBSI", "Intensity Histogram 10th Percentile"),
            IntensityHistogram90thPercentile => ("OZ0C", "IBSI", "Intensity Histogram 90th Percentile"),
            IntensityHistogramMaximumGrayLevel => ("3NCY", "IBSI", "Intensity Histogram Maximum Gray Level"),
            IntensityHistogramMode => ("AMMC", "IBSI", "Intensity Histogram Mode"),
            IntensityHistogramInterquartileRange => ("WR0O", "IBSI", "Intensity Histogram Interquartile Range"),
            IntensityHistogramRange => ("5Z3W", "IBSI", "Intensity Histogram Range"),
            IntensityHistogramMeanAbsoluteDeviation => ("D2ZX", "IBSI", "Intensity Histogram Mean Absolute Deviation"),
            IntensityHistogramRobustMeanAbsoluteDeviation => ("WRZB", "IBSI", "Intensity Histogram Robust Mean Absolute Deviation"),
            IntensityHistogramMedianAbsoluteDeviation => ("4RNL", "IBSI", "Intensity Histogram Median Absolute Deviation"),
            IntensityHistogramCoefficientOfVariation => ("CWYJ", "IBSI", "Intensity Histogram Coefficient of Variation"),
            IntensityHistogramQuartileCoefficientOfDispersion => ("SLWD", "IBSI", "Intensity Histogram Quartile Coefficient of Dispersion"),
            IntensityHistogramEntropy => ("TLU2", "IBSI", "Intensity Histogram Entropy"),
            IntensityHistogramUniformity => ("BJ5W", "IBSI", "Intensity Histogram Uniformity"),
            IntensityHistogramMaximumGradient => ("12CE", "IBSI", "Intensity Histogram Maximum Gradient"),
            IntensityHistogramMaximumGradientGrayLevel => ("8E6O", "IBSI", "Intensity Histogram Maximum Gradient Gray Level"),
            IntensityHistogramMinimumGradient => ("VQB3", "IBSI", "Intensity Histogram Minimum Gradient"),
            IntensityHistogramMinimumGradientGrayLevel => ("RHQZ", "IBSI", "Intensity Histogram Minimum Gradient Gray Level"),
            JointEntropyOfGlcm => ("TU9B", "IBSI", "Joint Entropy of GLCM"),
            RootAngularSecondMomentOfGlcm => ("126061", "DCM", "Root Angular Second Moment of GLCM"),
            InverseDifferenceMomentOfGlcm => ("WF0Z", "IBSI", "Inverse Difference Moment of GLCM"),
            ContrastOfGlcm => ("ACUI", "IBSI", "Contrast of GLCM"),
            DissimilarityOfGlcm => ("8S9J", "IBSI", "Dissimilarity of GLCM"),
            AngularSecondMomentOfGlcm => ("8ZQL", "IBSI", "Angular Second Moment of GLCM"),
            CorrelationOfGlcm => ("NI2N", "IBSI", "Correlation of GLCM"),
            JointMaximumOfGlcm => ("GYBY", "IBSI", "Joint Maximum of GLCM"),
            JointAverageOfGlcm => ("60VM", "IBSI", "Joint Average of GLCM"),
            JointVarianceOfGlcm => ("UR99", "IBSI", "Joint Variance of GLCM"),
            DifferenceAverageOfGlcm => ("TF7R", "IBSI", "Difference Average of GLCM"),
            DifferenceVarianceOfGlcm => ("D3YU", "IBSI", "Difference Variance of GLCM"),
            DifferenceEntropyOfGlcm => ("NTRS", "IBSI", "Difference Entropy of GLCM"),
            SumAverageOfGlcm => ("ZGXS", "IBSI", "Sum Average of GLCM"),
            SumVarianceOfGlcm => ("OEEB", "IBSI", "Sum Variance of GLCM"),
            SumEntropyOfGlcm => ("P6QZ", "IBSI", "Sum Entropy of GLCM"),
            InverseDifferenceOfGlcm => ("IB1Z", "IBSI", "Inverse Difference of GLCM"),
            NormalizedInverseDifferenceOfGlcm => ("NDRX", "IBSI", "Normalized Inverse Difference of GLCM"),
            NormalizedInverseDifferenceMomentOfGlcm => ("1QCO", "IBSI", "Normalized Inverse Difference Moment of GLCM"),
            InverseVarianceOfGlcm => ("E8JP", "IBSI", "Inverse Variance of GLCM"),
            AutocorrelationOfGlcm => ("QWB0", "IBSI", "Autocorrelation of GLCM"),
            ClusterTendencyOfGlcm => ("DG8W", "IBSI", "Cluster Tendency of GLCM"),
            ClusterShadeOfGlcm => ("7NFM", "IBSI", "Cluster Shade of GLCM"),
            ClusterProminenceOfGlcm => ("AE86", "IBSI", "Cluster Prominence of GLCM"),
            FirstMeasureOfInformationCorrelationOfGlcm => ("R8DG", "IBSI", "First Measure of Information Correlation of GLCM"),
            SecondMeasureOfInformationCorrelationOfGlcm => ("JN9H", "IBSI", "Second Measure of Information Correlation of GLCM"),
            ShortRunsEmphasis => ("22OV", "IBSI", "Short Runs Emphasis"),
            LongRunsEmphasis => ("W4KF", "IBSI", "Long Runs Emphasis"),
            LowGrayLevelRunEmphasis => ("V3SW", "IBSI", "Low Gray Level Run Emphasis"),
            HighGrayLevelRunEmphasis => ("G3QZ", "IBSI", "High Gray Level Run Emphasis"),
            ShortRunLowGrayLevelEmphasis => ("HTZT", "IBSI", "Short Run Low Gray Level Emphasis"),
            ShortRunHighGrayLevelEmphasis => ("GD3A", "IBSI", "Short Run High Gray Level Emphasis"),
            LongRunLowGrayLevelEmphasis => ("IVPO", "IBSI", "Long Run Low Gray Level Emphasis"),
            LongRunHighGrayLevelEmphasis => ("3KUM", "IBSI", "Long Run High Gray Level Emphasis"),
            GrayLevelNonuniformityInRuns => ("R5YN", "IBSI", "Gray Level Nonuniformity in Runs"),
            NormalizedGrayLevelNonuniformityInRuns => ("OVBL", "IBSI", "Normalized Gray Level Nonuniformity in Runs"),
            RunLengthNonuniformity => ("W92Y", "IBSI", "Run Length Nonuniformity"),
            NormalizedRunLengthNonuniformity => ("IC23", "IBSI", "Normalized Run Length Nonuniformity"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabulary;
    use dcmr_types::CodedEntry;

    #[test]
    fn test_features_from_several_schemes() {
        let group = Cid218QuantitativeImageFeature::new();
        assert!(group.is_extensible());
        assert_eq!(
            QuantitativeImageFeature::RootAngularSecondMomentOfGlcm.standard_entry(),
            CodedEntry::new("126061", "DCM", "Root Angular Second Moment of GLCM")
        );
        let entropy = CodedEntry::new("TU9B", "IBSI", "Joint Entropy of GLCM");
        assert!(group.has_coded_entry(&entropy));
        assert_eq!(
            QuantitativeImageFeature::from_name("IntensityHistogram90thPercentile"),
            Some(QuantitativeImageFeature::IntensityHistogram90thPercentile)
        );
    }
}
